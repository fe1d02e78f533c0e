use std::{collections::HashMap, ffi::CString};

use rsmpeg::avutil::AVDictionary;

use cstr::cstr;

use crate::error::{Error, Result};

/// Codec options, handed to libavcodec when a decoder is opened.
#[derive(Default, Clone, Debug)]
pub struct Options {
    pairs: HashMap<String, (String, u32)>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.pairs.insert(key.to_string(), (value.to_string(), 0));
        self
    }

    pub fn set_flags(mut self, key: &str, value: &str, flags: u32) -> Self {
        self.pairs
            .insert(key.to_string(), (value.to_string(), flags));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key).map(|(value, _)| value.as_str())
    }

    pub fn to_av_dict(self) -> Result<AVDictionary> {
        let mut dict = AVDictionary::new(cstr!(""), cstr!(""), 0);

        for (key, (value, flags)) in self.pairs {
            let (Ok(c_key), Ok(c_value)) = (CString::new(key.as_str()), CString::new(value)) else {
                return Err(Error::InvalidOption(key));
            };

            dict = dict.set(&c_key, &c_value, flags);
        }

        Ok(dict)
    }
}
