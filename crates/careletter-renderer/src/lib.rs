mod bundle;
mod document;
mod docx;
mod error;
mod letter;
mod preview;
mod settings;
mod summary;

pub use bundle::Bundle;
pub use document::{
    Alignment, Block, Document, Font, Length, Paragraph, ParagraphFormat, Run, Table, TableCell,
    TableRow,
};
pub use docx::{document_xml, write_docx};
pub use error::DocxError;
pub use letter::{LetterRenderer, NumberingState, RenderedLetter, letter_label, roman_label};
pub use preview::{Preview, preview_html};
pub use settings::RenderSettings;
pub use summary::{AdviceSummary, render_advice_summary};
