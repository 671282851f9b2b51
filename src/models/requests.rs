//! Request DTOs for the image gateway
//!
//! Defines the query parameters accepted by `GET /image/*source`.

/// Raw transformation parameters from the query string.
///
/// Values are kept as strings so the policy layer decides what is valid;
/// the parser treats an empty value like an absent one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageQuery {
    /// Target width in pixels, `0` lets the backend infer it
    pub width: Option<String>,
    /// Target height in pixels, `0` lets the backend infer it
    pub height: Option<String>,
    /// Output quality, 1 to 100
    pub quality: Option<String>,
}

impl ImageQuery {
    /// Builds the query from decoded pairs in arrival order.
    ///
    /// The first occurrence of a repeated parameter wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::default();

        for (name, value) in pairs {
            let slot = match name.as_ref() {
                "width" => &mut query.width,
                "height" => &mut query.height,
                "quality" => &mut query.quality,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }

        query
    }
}
