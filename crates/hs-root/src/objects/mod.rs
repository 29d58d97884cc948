//! Object decoders, dispatched by class name.

mod th1;

use crate::error::{Result, RootError};
use crate::histogram::Histogram;
use crate::rbuffer::ArrayElem;

/// Content array type for each supported 1D histogram class.
fn th1_content(class_name: &str) -> Option<ArrayElem> {
    match class_name {
        "TH1D" => Some(ArrayElem::F64),
        "TH1F" => Some(ArrayElem::F32),
        "TH1I" => Some(ArrayElem::I32),
        "TH1S" => Some(ArrayElem::I16),
        "TH1C" => Some(ArrayElem::I8),
        _ => None,
    }
}

/// Whether [`read_histogram`] can decode objects of this class.
pub fn is_supported_histogram(class_name: &str) -> bool {
    th1_content(class_name).is_some()
}

/// Decode a histogram from a decompressed object payload.
pub fn read_histogram(payload: &[u8], class_name: &str) -> Result<Histogram> {
    let elem = th1_content(class_name)
        .ok_or_else(|| RootError::UnsupportedClass(class_name.to_string()))?;
    th1::read_th1(payload, class_name, elem)
}
