use crate::options::SortOrder;
use crate::SourceImage;

/// Put the batch in its final page order.
///
/// Uploaded order is the identity. Filename order is a stable ascending
/// sort on the lowercased name (byte order of the original name breaks
/// ties), so re-sorting a sorted batch is a no-op.
pub fn resolve_order(mut images: Vec<SourceImage>, order: SortOrder) -> Vec<SourceImage> {
    if order == SortOrder::Filename {
        images.sort_by(|a, b| {
            a.filename
                .to_lowercase()
                .cmp(&b.filename.to_lowercase())
                .then_with(|| a.filename.cmp(&b.filename))
        });
    }
    images
}
