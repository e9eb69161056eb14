pub mod annotation;
pub mod classification;
pub mod commentary;
pub mod evaluation;
pub mod movetext;
pub mod notation;
pub mod overlay;
pub mod record;
