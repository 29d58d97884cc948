//! System font faces used for text layout and for PDF/PNG conversion.
//!
//! The SVG asks for [`FONT_FAMILY`]; layout measures the face the same family
//! list resolves to in the system font database, and the PDF/PNG converters
//! share that database.

use std::sync::{Arc, OnceLock};

use ab_glyph::FontVec;
use tracing::{debug, warn};
use usvg::fontdb::{self, Database, Family, Query};

use crate::RenderError;
use crate::primitives::FontWeight;

/// `font-family` written on every text element.
pub const FONT_FAMILY: &str = "DejaVu Sans, Arial, sans-serif";

const FAMILIES: [Family<'static>; 3] = [Family::Name("DejaVu Sans"), Family::Name("Arial"), Family::SansSerif];

pub struct FontHandle {
    pub regular: FontVec,
    pub bold: FontVec,
    pub italic: FontVec,
}

impl FontHandle {
    /// Resolve the regular, bold and italic faces from `db`.
    ///
    /// Bold and italic fall back to the regular face; the regular face falls
    /// back to the first face in the database. Fails only on an empty database.
    pub fn from_database(db: &Database) -> crate::Result<Self> {
        let regular_id = match query(db, fontdb::Weight::NORMAL, fontdb::Style::Normal) {
            Some(id) => id,
            None => {
                let first = db.faces().next().ok_or_else(|| {
                    RenderError::Font("no fonts installed; text cannot be laid out or rendered".into())
                })?;
                warn!(
                    family = first.families.first().map(|(name, _)| name.as_str()).unwrap_or("?"),
                    "no face for '{FONT_FAMILY}', falling back to the first system font"
                );
                first.id
            }
        };
        let bold_id = query(db, fontdb::Weight::BOLD, fontdb::Style::Normal).unwrap_or(regular_id);
        let italic_id = query(db, fontdb::Weight::NORMAL, fontdb::Style::Italic).unwrap_or(regular_id);

        Ok(Self { regular: load(db, regular_id)?, bold: load(db, bold_id)?, italic: load(db, italic_id)? })
    }

    /// Faces from the process-wide system font database.
    pub fn system() -> crate::Result<&'static FontHandle> {
        static SYSTEM: OnceLock<std::result::Result<FontHandle, String>> = OnceLock::new();
        SYSTEM
            .get_or_init(|| FontHandle::from_database(system_fontdb()).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|e| RenderError::Font(e.clone()))
    }

    pub fn select(&self, weight: FontWeight, italic: bool) -> &FontVec {
        match (weight, italic) {
            (FontWeight::Bold, _) => &self.bold,
            (_, true) => &self.italic,
            _ => &self.regular,
        }
    }
}

/// System fonts, loaded once per process.
pub fn system_fontdb() -> &'static Arc<Database> {
    static DB: OnceLock<Arc<Database>> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = Database::new();
        db.load_system_fonts();
        debug!(faces = db.len(), "loaded system fonts");
        if db.is_empty() {
            warn!("no system fonts found; text will be missing from PDF/PNG output");
        }
        Arc::new(db)
    })
}

fn query(db: &Database, weight: fontdb::Weight, style: fontdb::Style) -> Option<fontdb::ID> {
    db.query(&Query { families: &FAMILIES, weight, stretch: fontdb::Stretch::Normal, style })
}

fn load(db: &Database, id: fontdb::ID) -> crate::Result<FontVec> {
    db.with_face_data(id, |data, index| FontVec::try_from_vec_and_index(data.to_vec(), index))
        .ok_or_else(|| RenderError::Font(format!("font face {id:?} is no longer available")))?
        .map_err(|e| RenderError::Font(e.to_string()))
}
