//! Collector for generated helper functions shared by many call sites
//!
//! Code generators request helpers by name. Each helper is rendered once;
//! later requests only return the name. The collected source is emitted in
//! ascending name order and the collector is emptied on emission.

use crate::error::{Error, Result};
use crate::yul_assert;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::debug;

/// Marks a helper whose creation is in progress
const STUB: &str = "<<STUB<<";

const SOURCE_LOCATION_MARKER: &str = "/// @src";

fn function_header() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| {
        Regex::new(r"function[ \t]+[a-zA-Z0-9_$]+\([^\)]*\)").expect("static regex is valid")
    })
}

#[derive(Debug, Default)]
pub struct MultiUseFunctionCollector {
    functions: BTreeMap<String, String>,
}

impl MultiUseFunctionCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Requests `name`, rendering it from full source text on first use.
    ///
    /// The creator may request further helpers, including `name` itself;
    /// such re-entrant requests see the placeholder and return immediately.
    pub fn create_function<F>(&mut self, name: &str, creator: F) -> Result<String>
    where
        F: FnOnce(&mut Self) -> Result<String>,
    {
        if self.functions.contains_key(name) {
            return Ok(name.to_string());
        }
        self.functions.insert(name.to_string(), STUB.to_string());
        let code = creator(self)?;
        yul_assert!(!code.is_empty(), "helper \"{}\" rendered empty", name);
        yul_assert!(
            !code.contains(STUB),
            "helper \"{}\" contains an unresolved placeholder",
            name
        );
        yul_assert!(
            defines(&code, name),
            "helper source does not define \"{}\"",
            name
        );
        debug!(helper = name, "created multi-use function");
        self.functions.insert(name.to_string(), code);
        Ok(name.to_string())
    }

    /// Requests `name`, rendering `function <name>(<args>) -> <rets> { <body> }`.
    ///
    /// The creator fills in parameter and return names and returns the body.
    pub fn create_function_with_signature<F>(&mut self, name: &str, creator: F) -> Result<String>
    where
        F: FnOnce(&mut Self, &mut Vec<String>, &mut Vec<String>) -> Result<String>,
    {
        let function_name = name.to_string();
        self.create_function(name, move |collector| {
            let mut arguments = Vec::new();
            let mut returns = Vec::new();
            let body = creator(collector, &mut arguments, &mut returns)?;
            yul_assert!(
                !body.trim().is_empty(),
                "empty body for multi-use function \"{}\"",
                function_name
            );
            let mut code = format!("function {}({})", function_name, arguments.join(", "));
            if !returns.is_empty() {
                code.push_str(" -> ");
                code.push_str(&returns.join(", "));
            }
            code.push_str(" {\n");
            for line in body.lines().filter(|line| !line.trim().is_empty()) {
                code.push_str("    ");
                code.push_str(line);
                code.push('\n');
            }
            code.push_str("}\n");
            Ok(code)
        })
    }

    /// Emits all helpers in name order and empties the collector.
    ///
    /// Helpers without a `/// @src` annotation get `location_comment`
    /// inserted before their header.
    pub fn requested_functions(&mut self, location_comment: &str) -> Result<String> {
        let functions = std::mem::take(&mut self.functions);
        let mut result = String::new();
        for (name, code) in functions {
            if code == STUB {
                return Err(Error::internal(format!(
                    "helper \"{}\" was never finished",
                    name
                )));
            }
            if code.contains(SOURCE_LOCATION_MARKER) || location_comment.is_empty() {
                result.push_str(&code);
            } else {
                let annotated = function_header().replacen(&code, 1, |caps: &regex::Captures| {
                    format!("{}\n{}", location_comment, &caps[0])
                });
                result.push_str(&annotated);
            }
            if !result.ends_with('\n') {
                result.push('\n');
            }
        }
        Ok(result)
    }
}

fn defines(code: &str, name: &str) -> bool {
    function_header().find_iter(code).any(|header| {
        header
            .as_str()
            .trim_start_matches("function")
            .trim_start()
            .starts_with(&format!("{}(", name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_created_once() {
        let mut collector = MultiUseFunctionCollector::new();
        let mut renders = 0;
        for _ in 0..3 {
            let name = collector
                .create_function("zero", |_| {
                    renders += 1;
                    Ok("function zero() -> r { }".to_string())
                })
                .unwrap();
            assert_eq!(name, "zero");
        }
        assert_eq!(renders, 1);
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_reentrant_request_sees_placeholder() {
        let mut collector = MultiUseFunctionCollector::new();
        collector
            .create_function("outer", |collector| {
                let inner = collector.create_function("outer", |_| Ok("unused".to_string()))?;
                let helper = collector.create_function("helper", |_| {
                    Ok("function helper() { }".to_string())
                })?;
                Ok(format!("function {}() {{ {}() }}", inner, helper))
            })
            .unwrap();
        assert_eq!(collector.len(), 2);
    }

    #[test]
    fn test_signature_rendering_and_order() {
        let mut collector = MultiUseFunctionCollector::new();
        collector
            .create_function_with_signature("b_shift", |_, args, rets| {
                args.push("value".to_string());
                rets.push("result".to_string());
                Ok("result := shl(1, value)".to_string())
            })
            .unwrap();
        collector
            .create_function("a_panic", |_| Ok("function a_panic() {\n    invalid()\n}\n".to_string()))
            .unwrap();

        let code = collector.requested_functions("").unwrap();
        assert_eq!(
            code,
            "function a_panic() {\n    invalid()\n}\nfunction b_shift(value) -> result {\n    result := shl(1, value)\n}\n"
        );
        assert!(collector.is_empty());
    }

    #[test]
    fn test_source_location_comment_inserted_once() {
        let mut collector = MultiUseFunctionCollector::new();
        collector
            .create_function("f", |_| Ok("function f() { }".to_string()))
            .unwrap();
        collector
            .create_function("g", |_| Ok("/// @src 0:1:2\nfunction g() { }".to_string()))
            .unwrap();
        let code = collector.requested_functions("/// @src 0:10:20").unwrap();
        assert_eq!(
            code,
            "/// @src 0:10:20\nfunction f() { }\n/// @src 0:1:2\nfunction g() { }\n"
        );
    }

    #[test]
    fn test_creator_must_define_name() {
        let mut collector = MultiUseFunctionCollector::new();
        let err = collector
            .create_function("expected", |_| Ok("function other() { }".to_string()))
            .unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn test_signature_requires_body() {
        let mut collector = MultiUseFunctionCollector::new();
        let err = collector
            .create_function_with_signature("empty", |_, arguments, _| {
                arguments.push("x".to_string());
                Ok("  \n".to_string())
            })
            .unwrap_err();
        assert!(err.is_internal());
        assert!(err.to_string().contains("empty body"));
    }
}
