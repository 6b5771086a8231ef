//! Runtime values and their JavaScript conversions.
//!
//! Two renderings exist for every value: [`Value::to_js_string`] is what
//! string concatenation and template literals produce, and
//! [`Value::inspect`] is what `console.log` prints for non-string
//! arguments.

use std::{fmt, rc::Rc};

use crate::type_checker::typed_ast::TypedFnDeclStmt;

use super::scope::Scope;

#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    Undefined,
    Object(Rc<ObjectValue>),
    Function(Rc<FunctionValue>),
}

/// An object literal or an `Error` instance. Compared by identity.
#[derive(Debug)]
pub struct ObjectValue {
    pub class_name: Option<String>,
    pub fields: Vec<(String, Value)>,
}

impl ObjectValue {
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NativeFunction {
    ConsoleLog,
    ConsoleError,
}

pub enum FunctionValue {
    User {
        declaration: TypedFnDeclStmt,
        closure: Rc<Scope>,
    },
    Native {
        name: String,
        function: NativeFunction,
    },
}

impl FunctionValue {
    pub fn get_name(&self) -> &str {
        match self {
            FunctionValue::User { declaration, .. } => &declaration.identifier,
            FunctionValue::Native { name, .. } => name,
        }
    }
}

// The closure scope usually holds the function itself, so it is left out.
impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Function: {}]", self.get_name())
    }
}

/// Formats a number the way JavaScript's `String(n)` does.
pub fn format_number(number: f64) -> String {
    if number.is_nan() {
        String::from("NaN")
    } else if number.is_infinite() {
        if number > 0.0 {
            String::from("Infinity")
        } else {
            String::from("-Infinity")
        }
    } else if number == 0.0 {
        String::from("0")
    } else if number.abs() >= 1e21 || number.abs() < 1e-6 {
        let formatted = format!("{:e}", number);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        }
    } else {
        format!("{}", number)
    }
}

impl Value {
    pub fn error(message: String) -> Value {
        Value::Object(Rc::new(ObjectValue {
            class_name: Some(String::from("Error")),
            fields: vec![
                (String::from("name"), Value::String(String::from("Error"))),
                (String::from("message"), Value::String(message)),
            ],
        }))
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(number) => *number != 0.0 && !number.is_nan(),
            Value::String(string) => !string.is_empty(),
            Value::Boolean(boolean) => *boolean,
            Value::Undefined => false,
            Value::Object(_) | Value::Function(_) => true,
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(number) => *number,
            Value::Boolean(true) => 1.0,
            Value::Boolean(false) => 0.0,
            Value::String(string) => {
                let trimmed = string.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            Value::Undefined | Value::Object(_) | Value::Function(_) => f64::NAN,
        }
    }

    /// `String(value)`.
    pub fn to_js_string(&self) -> String {
        match self {
            Value::Number(number) => format_number(*number),
            Value::String(string) => string.clone(),
            Value::Boolean(boolean) => boolean.to_string(),
            Value::Undefined => String::from("undefined"),
            Value::Object(object) => match object.class_name.as_deref() {
                Some("Error") => error_summary(object),
                _ => String::from("[object Object]"),
            },
            Value::Function(function) => format!("[Function: {}]", function.get_name()),
        }
    }

    /// The `console.log` rendering of a value nested inside another.
    pub fn inspect(&self) -> String {
        match self {
            Value::Number(number) if *number == 0.0 && number.is_sign_negative() => {
                String::from("-0")
            }
            Value::String(string) => format!("'{}'", string.replace('\'', "\\'")),
            Value::Object(object) if object.class_name.as_deref() == Some("Error") => {
                error_summary(object)
            }
            Value::Object(object) if object.fields.is_empty() => String::from("{}"),
            Value::Object(object) => {
                let fields = object
                    .fields
                    .iter()
                    .map(|(name, value)| format!("{}: {}", name, value.inspect()))
                    .collect::<Vec<String>>()
                    .join(", ");
                format!("{{ {} }}", fields)
            }
            other => other.to_js_string(),
        }
    }

    /// Renders one `console.log` argument: strings print raw at the top
    /// level, everything else is inspected.
    pub fn to_console_string(&self) -> String {
        match self {
            Value::String(string) => string.clone(),
            other => other.inspect(),
        }
    }

    /// `===`
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(left), Value::Number(right)) => left == right,
            (Value::String(left), Value::String(right)) => left == right,
            (Value::Boolean(left), Value::Boolean(right)) => left == right,
            (Value::Undefined, Value::Undefined) => true,
            (Value::Object(left), Value::Object(right)) => Rc::ptr_eq(left, right),
            (Value::Function(left), Value::Function(right)) => Rc::ptr_eq(left, right),
            _ => false,
        }
    }

    /// `==`, with the primitive coercions of the abstract equality algorithm.
    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, _) | (_, Value::Undefined) => self.strict_equals(other),
            (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
                self.to_number() == other.to_number()
            }
            (Value::Boolean(_), _) => Value::Number(self.to_number()).loose_equals(other),
            (_, Value::Boolean(_)) => self.loose_equals(&Value::Number(other.to_number())),
            (Value::Object(_) | Value::Function(_), Value::String(_) | Value::Number(_)) => {
                Value::String(self.to_js_string()).loose_equals(other)
            }
            (Value::String(_) | Value::Number(_), Value::Object(_) | Value::Function(_)) => {
                self.loose_equals(&Value::String(other.to_js_string()))
            }
            _ => self.strict_equals(other),
        }
    }
}

fn error_summary(object: &ObjectValue) -> String {
    match object.get_field("message").map(Value::to_js_string) {
        Some(message) if !message.is_empty() => format!("Error: {}", message),
        _ => String::from("Error"),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_js_string())
    }
}
