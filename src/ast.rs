//! Public document model consumed by the code synthesis core.

use serde_json::{Number as JsonNumber, Value as JsonValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Primitive `type` keyword of a schema node.
pub enum Kind {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
    Any,
    Unknown,
}

impl Kind {
    /// Maps a `type` keyword to a [`Kind`], if it is one of the known primitives.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            "null" => Some(Self::Null),
            "any" => Some(Self::Any),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Integer)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// `exclusiveMinimum` / `exclusiveMaximum`, in either OpenAPI 3.0 or 3.1 form.
pub enum ExclusiveBound {
    /// 3.0 style: turns the sibling `minimum`/`maximum` into a strict bound.
    Flag(bool),
    /// 3.1 style: the strict bound itself.
    Value(JsonNumber),
}

#[derive(Debug, Clone, PartialEq)]
/// `additionalProperties` of an object node.
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<SchemaNode>),
}

#[derive(Debug, Clone, Default, PartialEq)]
/// One node of the input type tree.
///
/// At most one of `kind`, `reference`, `all_of`, `one_of`, `any_of` and `not`
/// acts as the primary discriminant; see [`crate::synth::Shape`].
pub struct SchemaNode {
    pub kind: Option<Kind>,
    /// Name of another named schema, already stripped of `#/components/schemas/`.
    pub reference: Option<String>,
    pub all_of: Option<Vec<SchemaNode>>,
    pub one_of: Option<Vec<SchemaNode>>,
    pub any_of: Option<Vec<SchemaNode>>,
    pub not: Option<Box<SchemaNode>>,
    /// Declared properties in source order. `None` when the keyword is absent.
    pub properties: Option<Vec<(String, SchemaNode)>>,
    pub required: Vec<String>,
    pub items: Option<Box<SchemaNode>>,
    pub enum_values: Option<Vec<JsonValue>>,
    pub pattern: Option<String>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub minimum: Option<JsonNumber>,
    pub maximum: Option<JsonNumber>,
    pub exclusive_minimum: Option<ExclusiveBound>,
    pub exclusive_maximum: Option<ExclusiveBound>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub format: Option<String>,
    pub nullable: bool,
    pub default: Option<JsonValue>,
    pub example: Option<JsonValue>,
    pub additional_properties: Option<AdditionalProperties>,
    pub description: Option<String>,
}

impl SchemaNode {
    /// Node with only a primitive kind set.
    pub fn of_kind(kind: Kind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Node that only references another named schema.
    pub fn reference(name: impl Into<String>) -> Self {
        Self {
            reference: Some(name.into()),
            ..Self::default()
        }
    }

    /// True for the bare `{ nullable: true }` marker used inside `allOf`.
    pub fn is_nullable_marker(&self) -> bool {
        *self
            == Self {
                nullable: true,
                ..Self::default()
            }
    }

    pub fn is_required(&self, property: &str) -> bool {
        self.required.iter().any(|name| name == property)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A `(name, schema)` pair of the document-level registry.
pub struct NamedSchema {
    pub name: String,
    pub schema: SchemaNode,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Named schemas in source declaration order.
pub struct Registry {
    entries: Vec<NamedSchema>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a schema, replacing an existing one with the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, schema: SchemaNode) {
        let name = name.into();
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.schema = schema,
            None => self.entries.push(NamedSchema { name, schema }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.schema)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedSchema> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, SchemaNode)> for Registry {
    fn from_iter<I: IntoIterator<Item = (N, SchemaNode)>>(iter: I) -> Self {
        let mut registry = Registry::new();
        for (name, schema) in iter {
            registry.insert(name, schema);
        }
        registry
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Methods in the order they are read from a path item.
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(token))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
/// Where a parameter travels. The declaration order is the emission order.
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    pub const ALL: [ParameterLocation; 4] = [
        ParameterLocation::Path,
        ParameterLocation::Query,
        ParameterLocation::Header,
        ParameterLocation::Cookie,
    ];

    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
        }
    }

    /// Key of this location's section inside a route's `request` object.
    pub fn request_key(self) -> &'static str {
        match self {
            Self::Path => "params",
            Self::Query => "query",
            Self::Header => "headers",
            Self::Cookie => "cookies",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub schema: SchemaNode,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
/// One `content-type -> schema` entry of a body or response.
pub struct MediaType {
    pub content_type: String,
    pub schema: SchemaNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestBody {
    pub required: bool,
    pub description: Option<String>,
    pub content: Vec<MediaType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Status code (`"200"`) or `"default"`.
    pub status: String,
    pub description: String,
    pub content: Vec<MediaType>,
}

#[derive(Debug, Clone, PartialEq)]
/// One `path + method` operation.
pub struct Endpoint {
    pub path: String,
    pub method: HttpMethod,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub request_body: Option<RequestBody>,
    pub responses: Vec<Response>,
}

impl Endpoint {
    pub fn new(path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            path: path.into(),
            method,
            operation_id: None,
            summary: None,
            description: None,
            tags: Vec::new(),
            parameters: Vec::new(),
            request_body: None,
            responses: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Fully loaded interface-definition document.
pub struct Document {
    pub schemas: Registry,
    /// Endpoints in path-then-method source order.
    pub endpoints: Vec<Endpoint>,
}
