use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Display color of an anatomical structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Creates a new Rgb
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a color from the first three integers in a string
    ///
    /// Accepts formats like:
    /// - "70 130 180" (LUT columns, trailing alpha ignored)
    /// - "[70 130 180]"
    /// - "(70, 130, 180)"
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than three components are found or one
    /// exceeds 255
    pub fn parse(s: &str) -> Result<Self, String> {
        static REGEX: OnceLock<Regex> = OnceLock::new();
        let re = REGEX.get_or_init(|| Regex::new(r"\d+").expect("Failed to compile regex"));

        let mut components = [0u8; 3];
        let mut numbers = re.find_iter(s).map(|m| m.as_str());
        for component in components.iter_mut() {
            let text = numbers
                .next()
                .ok_or_else(|| format!("Failed to parse color from '{}'", s))?;
            *component = text
                .parse()
                .map_err(|e| format!("Invalid color component '{}': {}", text, e))?;
        }

        let [r, g, b] = components;
        Ok(Rgb { r, g, b })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {} {}]", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lut_columns() {
        let rgb = Rgb::parse("220 216  20 0").unwrap();
        assert_eq!(rgb, Rgb::new(220, 216, 20));
    }

    #[test]
    fn test_parse_bracketed() {
        let rgb = Rgb::parse("[ 70 130 180]").unwrap();
        assert_eq!(rgb, Rgb::new(70, 130, 180));
    }

    #[test]
    fn test_parse_tuple() {
        let rgb = Rgb::parse("(0, 0, 255)").unwrap();
        assert_eq!(rgb, Rgb::new(0, 0, 255));
    }

    #[test]
    fn test_display_round_trips() {
        let rgb = Rgb::new(12, 48, 255);
        assert_eq!(rgb.to_string(), "[12 48 255]");
        assert_eq!(Rgb::parse(&rgb.to_string()).unwrap(), rgb);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Rgb::parse("invalid").is_err());
        assert!(Rgb::parse("").is_err());
        assert!(Rgb::parse("1 2").is_err());
        assert!(Rgb::parse("256 0 0").is_err());
    }
}
