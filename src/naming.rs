//! Identifier derivation for schema bindings, type aliases, routes and keys.
//!
//! Every function here is pure: schema declarations, type aliases and
//! reference use sites derive identifiers independently and must agree.

use serde::{Deserialize, Serialize};

/// Suffix that marks a binding as a validator.
pub const SCHEMA_SUFFIX: &str = "Schema";

const TYPESCRIPT_RESERVED: &[&str] = &[
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "import",
    "in",
    "instanceof",
    "new",
    "null",
    "return",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    "let",
    "static",
    "yield",
    "await",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NamingConvention {
    /// First letter capitalized: `UserSchema`, `User`.
    #[default]
    #[serde(rename = "PascalCase")]
    TitleCase,
    /// First letter lowercased: `userSchema`, `user`.
    #[serde(rename = "camelCase")]
    LowerCamel,
}

impl NamingConvention {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "PascalCase" | "pascal" | "title" => Some(Self::TitleCase),
            "camelCase" | "camel" => Some(Self::LowerCamel),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// `const UserSchema = z.object(...)`
    SchemaVariable,
    /// `type User = z.infer<typeof UserSchema>`
    TypeDeclaration,
}

/// Maps a logical schema name to the identifier emitted for `role`.
pub fn resolve_identifier(logical_name: &str, convention: NamingConvention, role: Role) -> String {
    let sanitized = sanitize_name(logical_name);
    let mut out = match convention {
        NamingConvention::TitleCase => capitalize_first(&sanitized),
        NamingConvention::LowerCamel => decapitalize_first(&sanitized),
    };

    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }

    match role {
        Role::SchemaVariable => out.push_str(SCHEMA_SUFFIX),
        Role::TypeDeclaration => {
            if out.is_empty() || is_reserved(&out) {
                out.push_str("Type");
            }
        }
    }

    out
}

/// Replaces every character outside `[A-Za-z0-9_$]` with `_`.
///
/// Also used for the literal name written into `.openapi("...")` metadata.
pub fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .map(|c| if is_ident_char(c) { c } else { '_' })
        .collect()
}

/// Renders an object key, quoting it when it is not a plain identifier.
///
/// `__proto__` is emitted as a computed key: in an object literal the plain
/// and quoted forms both set the prototype instead of defining a property.
pub fn render_property_name(raw: &str) -> String {
    if raw == "__proto__" {
        format!("[{}]", quote_string(raw))
    } else if is_valid_identifier(raw) {
        raw.to_string()
    } else {
        quote_string(raw)
    }
}

/// JSON-style double-quoted string literal, valid in TypeScript.
pub fn quote_string(raw: &str) -> String {
    serde_json::to_string(raw).unwrap_or_else(|_| format!("\"{}\"", escape_string(raw)))
}

fn escape_string(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

/// camelCase identifier built from the alphanumeric tokens of `raw`.
///
/// Used for route bindings: `get /users/{id}` -> `getUsersId`.
pub fn to_camel_case(raw: &str) -> String {
    let tokens = identifier_tokens(raw);
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i == 0 {
            out.push_str(token);
        } else {
            out.push_str(&capitalize_first(token));
        }
    }
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

fn identifier_tokens(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for chunk in raw.split(|c: char| !c.is_ascii_alphanumeric()) {
        if chunk.is_empty() {
            continue;
        }
        tokens.extend(split_camel_tokens(chunk));
    }
    tokens
}

fn split_camel_tokens(chunk: &str) -> Vec<String> {
    let chars: Vec<char> = chunk.chars().collect();
    let mut tokens = Vec::new();
    let mut start = 0usize;

    for i in 1..chars.len() {
        let prev = chars[i - 1];
        let curr = chars[i];
        let next = chars.get(i + 1).copied();

        let boundary = (prev.is_ascii_lowercase() && curr.is_ascii_uppercase())
            || (prev.is_ascii_uppercase()
                && curr.is_ascii_uppercase()
                && next.is_some_and(|n| n.is_ascii_lowercase()));

        if boundary {
            tokens.push(chars[start..i].iter().collect::<String>().to_ascii_lowercase());
            start = i;
        }
    }

    if start < chars.len() {
        tokens.push(chars[start..].iter().collect::<String>().to_ascii_lowercase());
    }

    tokens
}

fn capitalize_first(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn decapitalize_first(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn is_ident_char(c: char) -> bool {
    c == '_' || c == '$' || c.is_ascii_alphanumeric()
}

fn is_valid_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    if !(first == '_' || first == '$' || first.is_ascii_alphabetic()) {
        return false;
    }

    chars.all(is_ident_char)
}

fn is_reserved(text: &str) -> bool {
    TYPESCRIPT_RESERVED.contains(&text)
}
