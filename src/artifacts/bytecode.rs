//! Bytecode related types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Byte offsets into the bytecode.
/// Linking replaces the 20 bytes located there.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct LinkReference {
    pub start: usize,
    pub length: usize,
}

/// `library file -> library name -> placeholder offsets`
pub type LinkReferences = BTreeMap<String, BTreeMap<String, Vec<LinkReference>>>;

#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bytecode {
    /// The bytecode as a hex string, `0x` prefixed or not depending on the emitter. Unlinked
    /// bytecode contains `__$<hash>$__` placeholders and is not valid hex.
    #[serde(default)]
    pub object: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub link_references: LinkReferences,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_map: Option<String>,
    /// Opcodes list (string)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opcodes: Option<String>,
}

impl Bytecode {
    /// All link references of libraries declared in the given file, in order of appearance.
    pub fn link_references_for(&self, file: &str) -> Vec<LinkReference> {
        let mut refs: Vec<_> = self
            .link_references
            .get(file)
            .into_iter()
            .flat_map(|libs| libs.values().flatten().copied())
            .collect();
        refs.sort_unstable_by_key(|r| r.start);
        refs
    }

    /// Returns `true` if the bytecode still contains library placeholders.
    pub fn is_unlinked(&self) -> bool {
        !self.link_references.is_empty() || self.object.contains("__")
    }

    /// The bytecode without a `0x` prefix.
    pub fn hex(&self) -> &str {
        self.object.strip_prefix("0x").unwrap_or(&self.object)
    }

    /// Decodes the bytecode into raw bytes. Fails for unlinked bytecode.
    pub fn bytes(&self) -> Result<Vec<u8>, hex::FromHexError> {
        hex::decode(self.hex())
    }

    /// Replaces every placeholder of `library` declared in `file` with `address`.
    ///
    /// `address` is a 20 byte hex string, with or without `0x`. Returns `false` and leaves the
    /// bytecode untouched if the address is malformed or the library is not referenced.
    pub fn link(&mut self, file: &str, library: &str, address: &str) -> bool {
        let address = address.strip_prefix("0x").unwrap_or(address);
        if address.len() != 40 || hex::decode(address).is_err() {
            return false;
        }
        let Some(offsets) = self.link_references.get(file).and_then(|libs| libs.get(library))
        else {
            return false;
        };

        let prefixed = self.object.starts_with("0x");
        let mut code = self.hex().to_string();
        for offset in offsets {
            let Some((start, end)) = hex_range(offset) else { return false };
            if end > code.len() || !code.is_char_boundary(start) || !code.is_char_boundary(end) {
                return false;
            }
            code.replace_range(start..end, address);
        }
        trace!(file, library, "linked library");

        self.object = if prefixed { format!("0x{code}") } else { code };
        if let Some(libs) = self.link_references.get_mut(file) {
            libs.remove(library);
            if libs.is_empty() {
                self.link_references.remove(file);
            }
        }
        true
    }
}

/// The hex character range of a byte offset, `None` on overflow.
fn hex_range(offset: &LinkReference) -> Option<(usize, usize)> {
    let start = offset.start.checked_mul(2)?;
    let end = start.checked_add(offset.length.checked_mul(2)?)?;
    Some((start, end))
}
