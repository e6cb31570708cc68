use std::fmt;
use std::str::FromStr;

/// Rendered cover image: where the image service published it, and the downloaded bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Illustration {
    pub remote_url: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for Illustration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Illustration")
            .field("remote_url", &self.remote_url)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

/// Visual style of the cover image. Chosen per deployment, never per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IllustrationStyle {
    #[default]
    Isometric,
    Comic,
}

impl FromStr for IllustrationStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "isometric" | "isometric3d" | "3d" => Ok(Self::Isometric),
            "comic" | "comic4" | "panels" => Ok(Self::Comic),
            other => anyhow::bail!("unknown illustration style: {other} (expected isometric|comic)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_style_names() {
        assert_eq!("isometric".parse::<IllustrationStyle>().unwrap(), IllustrationStyle::Isometric);
        assert_eq!(" Comic ".parse::<IllustrationStyle>().unwrap(), IllustrationStyle::Comic);
        assert!("watercolor".parse::<IllustrationStyle>().is_err());
    }
}
