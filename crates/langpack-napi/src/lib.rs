//! NAPI-RS bridge exposing a langpack parser package to Node.
//!
//! `ParserFactory()` resolves to a `Parser` object with `getLangs`,
//! `parsePattern` and `parseTarget`. Parse results cross the FFI boundary as
//! JSON strings; the core types already implement `Serialize`.

use langpack_core::{Lang, Package, ParserFactory, ParserHandle};
use napi_derive::napi;

#[cfg(not(any(feature = "php", feature = "python")))]
compile_error!("enable the `php` or `python` feature");

#[cfg(feature = "php")]
const DEFAULT_PACKAGE: Package = Package::Php;
#[cfg(all(feature = "python", not(feature = "php")))]
const DEFAULT_PACKAGE: Package = Package::Python;

fn to_napi(op: &str, e: anyhow::Error) -> napi::Error {
    napi::Error::from_reason(format!("{op} failed: {e:#}"))
}

fn to_json<T: serde::Serialize>(value: &T) -> napi::Result<String> {
    serde_json::to_string(value)
        .map_err(|e| napi::Error::from_reason(format!("JSON serialization failed: {e}")))
}

// ---------------------------------------------------------------------------
// Exported functions
// ---------------------------------------------------------------------------

/// Load a parser package. Defaults to the package this addon was built for.
#[napi(js_name = "ParserFactory")]
pub async fn parser_factory(package: Option<String>) -> napi::Result<Parser> {
    let package = match package {
        Some(name) => Package::parse(&name).map_err(|e| to_napi("ParserFactory", e))?,
        None => DEFAULT_PACKAGE,
    };
    let handle = ParserFactory::new(package)
        .load()
        .await
        .map_err(|e| to_napi("ParserFactory", e))?;
    Ok(Parser { handle })
}

#[napi]
pub struct Parser {
    handle: ParserHandle,
}

#[napi]
impl Parser {
    /// Numeric language ids of the package, default language first.
    #[napi]
    pub fn get_langs(&self) -> Vec<u32> {
        self.handle.get_langs()
    }

    /// Parse a pattern; returns the pattern as JSON.
    #[napi]
    pub fn parse_pattern(&self, strict: bool, pattern: String, lang: Option<u32>) -> napi::Result<String> {
        let result = match lang {
            Some(id) => {
                let lang = lang_from_id(id)?;
                self.handle.parse_pattern_as(lang, strict, &pattern)
            }
            None => self.handle.parse_pattern(strict, &pattern),
        };
        to_json(&result.map_err(|e| to_napi("parsePattern", e))?)
    }

    /// Parse a file; returns the target as JSON.
    #[napi]
    pub fn parse_target(&self, path: String, lang: Option<u32>) -> napi::Result<String> {
        let result = match lang {
            Some(id) => {
                let lang = lang_from_id(id)?;
                self.handle.parse_target_as(lang, &path)
            }
            None => self.handle.parse_target(&path),
        };
        to_json(&result.map_err(|e| to_napi("parseTarget", e))?)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn lang_from_id(id: u32) -> napi::Result<Lang> {
    Lang::from_id(id).ok_or_else(|| napi::Error::from_reason(format!("unknown language id: {id}")))
}
