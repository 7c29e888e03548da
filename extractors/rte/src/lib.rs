mod common;
pub mod player;
pub mod radio;
mod types;

use once_cell::sync::Lazy;
pub use player::RteRE;
pub use radio::RteRadioRE;
use rtex_extractor_api::{AnyExtractor, NewExtractor};

pub static EXTRACTORS: Lazy<Vec<AnyExtractor>> = Lazy::new(|| {
    vec![
        AnyExtractor::Recording(Box::new(RteRE::new())),
        AnyExtractor::Recording(Box::new(RteRadioRE::new())),
    ]
});
