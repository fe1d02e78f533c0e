use crate::error::{Error, Result};

macro_rules! builder_set {
    ($attr_name: ident, $attr_type: ty) => {
        pub fn $attr_name(mut self, $attr_name: $attr_type) -> Self {
            self.$attr_name = Some($attr_name);
            self
        }
    }
}

#[cfg_attr(not(feature = "ffmpeg"), allow(dead_code))]
pub fn unwrap_mandatory<V>(value: Option<V>, field: &'static str) -> Result<V> {
    value.ok_or(Error::MissingField(field))
}

#[cfg(test)]
mod tests {
    use super::unwrap_mandatory;
    use crate::error::Error;

    #[test]
    fn missing_mandatory_field_is_named() {
        let result = unwrap_mandatory::<u32>(None, "width");
        assert!(matches!(result, Err(Error::MissingField("width"))));
        assert_eq!(unwrap_mandatory(Some(7), "width").unwrap(), 7);
    }
}
