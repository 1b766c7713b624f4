//! Binding of endpoint parameters and bodies into request shapes.

use crate::ast::{Kind, MediaType, Parameter, ParameterLocation, RequestBody};
use crate::diagnostics::Diagnostics;
use crate::synth::{resolved_kind, synthesize, SynthContext};

/// Adapter applied to textual query values before a numeric validator.
pub const NUMBER_COERCION: &str = "z.preprocess((value) => Number(value), ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterBinding {
    pub location: ParameterLocation,
    pub name: String,
    /// Final validator, including coercion and `.optional()` when they apply.
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// All parameters bound at one location.
pub struct ParameterGroup {
    pub location: ParameterLocation,
    pub bindings: Vec<ParameterBinding>,
}

impl ParameterGroup {
    /// `z.object({ ... })` over the group's bindings.
    pub fn object_expression(&self) -> String {
        let entries: Vec<String> = self
            .bindings
            .iter()
            .map(|binding| {
                format!(
                    "{}: {}",
                    crate::naming::render_property_name(&binding.name),
                    binding.expression
                )
            })
            .collect();
        format!("z.object({{ {} }})", entries.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBinding {
    pub content_type: String,
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyBinding {
    pub required: bool,
    pub description: Option<String>,
    pub content: Vec<ContentBinding>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Request validation sections of one endpoint. Empty locations are absent.
pub struct RequestShape {
    pub groups: Vec<ParameterGroup>,
    pub body: Option<BodyBinding>,
}

impl RequestShape {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.body.is_none()
    }

    pub fn group(&self, location: ParameterLocation) -> Option<&ParameterGroup> {
        self.groups.iter().find(|group| group.location == location)
    }
}

/// Binds one parameter.
///
/// Path parameters carry `param` metadata, numeric query parameters are
/// wrapped in [`NUMBER_COERCION`], optional parameters end in `.optional()`.
pub fn bind_parameter(
    parameter: &Parameter,
    ctx: &SynthContext<'_>,
    diagnostics: &mut Diagnostics,
) -> ParameterBinding {
    let mut param_ctx = ctx.child(&format!(
        "parameters.{}.{}",
        parameter.location.as_str(),
        parameter.name
    ));
    if parameter.location == ParameterLocation::Path {
        param_ctx = param_ctx.with_param(parameter.name.clone(), ParameterLocation::Path);
    }

    let mut expression = synthesize(&parameter.schema, &param_ctx, diagnostics);

    if parameter.location == ParameterLocation::Query
        && resolved_kind(&parameter.schema, ctx).is_some_and(Kind::is_numeric)
    {
        expression = format!("{NUMBER_COERCION}{expression})");
    }

    if !parameter.required {
        expression.push_str(".optional()");
    }

    ParameterBinding {
        location: parameter.location,
        name: parameter.name.clone(),
        expression,
    }
}

/// Groups parameter bindings by location and binds the optional body.
pub fn bind_parameters(
    parameters: &[Parameter],
    body: Option<&RequestBody>,
    ctx: &SynthContext<'_>,
    diagnostics: &mut Diagnostics,
) -> RequestShape {
    let mut groups = Vec::new();
    for location in ParameterLocation::ALL {
        let bindings: Vec<ParameterBinding> = parameters
            .iter()
            .filter(|parameter| parameter.location == location)
            .map(|parameter| bind_parameter(parameter, ctx, diagnostics))
            .collect();
        if !bindings.is_empty() {
            groups.push(ParameterGroup { location, bindings });
        }
    }

    let body = body.and_then(|body| {
        let content = bind_content(&body.content, &ctx.child("requestBody"), diagnostics);
        if content.is_empty() {
            return None;
        }
        Some(BodyBinding {
            required: body.required,
            description: body.description.clone(),
            content,
        })
    });

    RequestShape { groups, body }
}

/// Synthesizes each content type's schema.
///
/// Content types whose synthesized expressions are identical share one
/// expression, and its diagnostics are reported once. Divergent content
/// types keep their own expressions.
pub fn bind_content(
    content: &[MediaType],
    ctx: &SynthContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<ContentBinding> {
    let mut out: Vec<ContentBinding> = Vec::with_capacity(content.len());

    for media in content {
        let mut scratch = Diagnostics::buffered();
        let media_ctx = ctx.child(&format!("content.{}", media.content_type));
        let expression = synthesize(&media.schema, &media_ctx, &mut scratch);

        let seen = out.iter().any(|binding| binding.expression == expression);
        if !seen {
            diagnostics.absorb(scratch);
        }

        out.push(ContentBinding {
            content_type: media.content_type.clone(),
            expression,
        });
    }

    out
}
