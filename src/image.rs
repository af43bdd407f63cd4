use crate::engine::Engine;

/// Human name and creation time of an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub name: String,
    pub created_at: Option<String>,
}

impl ResolvedImage {
    fn fallback(reference: &str) -> Self {
        Self {
            name: reference.to_owned(),
            created_at: None,
        }
    }
}

/// Maps opaque image references (ids or tags) to their first repo tag.
///
/// Resolution is best-effort enrichment: every failure degrades to the raw reference and no
/// timestamp, and is only logged.
#[derive(Debug)]
pub struct ImageResolver<'a, E> {
    engine: &'a E,
}

impl<'a, E: Engine> ImageResolver<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    pub async fn resolve(&self, reference: &str) -> ResolvedImage {
        match self.engine.inspect_image(reference).await {
            Ok(image) => {
                let name = image
                    .repo_tags
                    .unwrap_or_default()
                    .into_iter()
                    .find(|tag| !tag.is_empty() && tag != "<none>:<none>")
                    .unwrap_or_else(|| reference.to_owned());
                ResolvedImage {
                    name,
                    created_at: image.created.filter(|c| !c.is_empty()),
                }
            }
            Err(err) => {
                log::warn!("failed to resolve image `{}`: {}", reference, err);
                ResolvedImage::fallback(reference)
            }
        }
    }
}
