// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

pub mod catalog;
pub mod change;
pub mod replication;
pub mod schema;
pub mod sequence;
pub mod storage;

/// A structured, code-addressable description of a failure.
///
/// Every error surfaced by the engine carries exactly one diagnostic. Codes
/// are stable strings (`CA_`, `SC_`, `SEQ_`, `ST_`, `RP_` prefixes) so callers
/// and tests can match on them without parsing messages.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub label: Option<String>,
    pub help: Option<String>,
    pub notes: Vec<String>,
    pub cause: Option<Box<Diagnostic>>,
}

pub struct DefaultRenderer {}

impl DefaultRenderer {
    pub fn render_string(diagnostic: &Diagnostic) -> String {
        let mut out = format!("[{}] {}", diagnostic.code, diagnostic.message);

        if let Some(label) = &diagnostic.label {
            out.push_str(&format!("\n  {}", label));
        }

        if let Some(help) = &diagnostic.help {
            out.push_str(&format!("\n  help: {}", help));
        }

        for note in &diagnostic.notes {
            out.push_str(&format!("\n  note: {}", note));
        }

        if let Some(cause) = &diagnostic.cause {
            out.push_str(&format!("\n  caused by: {}", Self::render_string(cause)));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_code_and_message() {
        let diagnostic = Diagnostic {
            code: "XX_001".to_string(),
            message: "something broke".to_string(),
            label: None,
            help: None,
            notes: vec![],
            cause: None,
        };

        assert_eq!(DefaultRenderer::render_string(&diagnostic), "[XX_001] something broke");
    }

    #[test]
    fn test_render_cause_chain() {
        let diagnostic = Diagnostic {
            code: "XX_002".to_string(),
            message: "outer".to_string(),
            label: None,
            help: Some("retry".to_string()),
            notes: vec!["first note".to_string()],
            cause: Some(Box::new(Diagnostic {
                code: "XX_003".to_string(),
                message: "inner".to_string(),
                label: None,
                help: None,
                notes: vec![],
                cause: None,
            })),
        };

        let rendered = DefaultRenderer::render_string(&diagnostic);
        assert!(rendered.contains("[XX_002] outer"));
        assert!(rendered.contains("help: retry"));
        assert!(rendered.contains("note: first note"));
        assert!(rendered.contains("caused by: [XX_003] inner"));
    }
}
