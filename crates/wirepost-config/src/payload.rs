use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Configuration {
    /// Name given to the single string field of the records the CLI
    /// builds from stdin lines. Only visible on the wire when the
    /// content type is form-urlencoded.
    #[serde(default = "default_field_name")]
    pub field_name: SmolStr,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            field_name: default_field_name(),
        }
    }
}

fn default_field_name() -> SmolStr {
    SmolStr::new_inline("payload")
}
