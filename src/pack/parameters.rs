use serde::Serialize;

use crate::errors::MattermostError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParameterType {
    String,
    /// Rich text from the host editor; forwarded to Mattermost as-is.
    Html,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDef {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_value: Option<&'static str>,
}

impl ParameterDef {
    #[must_use]
    pub const fn required(name: &'static str, kind: ParameterType, description: &'static str) -> Self {
        Self {
            name,
            description,
            kind,
            optional: false,
            suggested_value: None,
        }
    }

    #[must_use]
    pub const fn optional(name: &'static str, kind: ParameterType, description: &'static str) -> Self {
        Self {
            name,
            description,
            kind,
            optional: true,
            suggested_value: None,
        }
    }

    #[must_use]
    pub const fn with_suggested_value(mut self, value: &'static str) -> Self {
        self.suggested_value = Some(value);
        self
    }
}

/// Positional host arguments matched against a formula's parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arguments<'a> {
    values: Vec<(&'static str, Option<&'a str>)>,
}

impl<'a> Arguments<'a> {
    /// Empty strings count as absent. An absent optional argument falls back
    /// to the parameter's suggested value, if any.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if a required argument is absent or more
    /// arguments are supplied than parameters are declared.
    pub fn bind(
        params: &[ParameterDef],
        args: &'a [Option<String>],
    ) -> Result<Self, MattermostError> {
        if args.len() > params.len() {
            return Err(MattermostError::InvalidParameter {
                name: "arguments".to_string(),
                reason: format!("expected at most {}, got {}", params.len(), args.len()),
            });
        }

        let mut values = Vec::with_capacity(params.len());
        for (i, param) in params.iter().enumerate() {
            let supplied = args
                .get(i)
                .and_then(Option::as_deref)
                .filter(|v| !v.is_empty());

            if supplied.is_none() && !param.optional {
                return Err(MattermostError::invalid_parameter(param.name, "is required"));
            }
            values.push((param.name, supplied.or(param.suggested_value)));
        }

        Ok(Self { values })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, v)| *v)
    }

    /// # Errors
    ///
    /// Returns `InvalidParameter` if `name` has no value.
    pub fn required(&self, name: &str) -> Result<&'a str, MattermostError> {
        self.get(name)
            .ok_or_else(|| MattermostError::invalid_parameter(name, "is required"))
    }
}
