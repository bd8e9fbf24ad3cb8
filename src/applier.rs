//! Cursor-preserving replacements.
//!
//! Hosts usually snap the cursor to the end of a programmatic replacement.
//! Every change the engine makes goes through [`replace_preserving_selection`]
//! instead, which maps the pre-edit selection through the edit and puts it
//! back explicitly.

use crate::annotation::{CorrectionEntry, CorrectionKind, NewCorrection};
use crate::text::{Edit, ReplaceOptions, TextHost};

/// Replace `from..to` with `text`, keeping the user's selection where it
/// was relative to the surrounding text.
pub fn replace_preserving_selection<H: TextHost + ?Sized>(
    host: &mut H,
    from: usize,
    to: usize,
    text: &str,
    options: ReplaceOptions,
) -> Edit {
    let before = host.selection();
    let edit = host.replace(from, to, text, options);
    host.set_selection(before.map(&edit));
    edit
}

/// Write `text` over a correction's range as a background change.
///
/// Returns the applied edit together with the correction as it now stands
/// in the document: `Auto`, covering `text`, remembering what it replaced.
pub fn auto_apply<H: TextHost + ?Sized>(
    host: &mut H,
    correction: NewCorrection,
    text: &str,
) -> (Edit, NewCorrection) {
    let edit = replace_preserving_selection(
        host,
        correction.from,
        correction.to,
        text,
        ReplaceOptions::background(),
    );
    let applied = NewCorrection {
        to: correction.from + edit.inserted_len(),
        kind: CorrectionKind::Auto,
        current_value: text.to_string(),
        ..correction
    };
    (edit, applied)
}

/// Put an auto-applied entry's original text back, as a background change.
pub fn revert<H: TextHost + ?Sized>(host: &mut H, entry: &CorrectionEntry) -> Edit {
    replace_preserving_selection(
        host,
        entry.from,
        entry.to,
        &entry.original_value,
        ReplaceOptions::background(),
    )
}
