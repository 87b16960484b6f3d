//! Customer details collected at checkout.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Contact and delivery details typed in by the shopper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerForm {
    pub nombre: String,
    pub direccion: String,
    pub comuna: String,
    pub telefono: String,
}

/// A field of [`CustomerForm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerField {
    Nombre,
    Direccion,
    Comuna,
    Telefono,
}

impl CustomerField {
    pub const ALL: [CustomerField; 4] = [
        CustomerField::Nombre,
        CustomerField::Direccion,
        CustomerField::Comuna,
        CustomerField::Telefono,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerField::Nombre => "nombre",
            CustomerField::Direccion => "direccion",
            CustomerField::Comuna => "comuna",
            CustomerField::Telefono => "telefono",
        }
    }
}

impl fmt::Display for CustomerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failing field and the message to show next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: CustomerField,
    pub message: &'static str,
}

/// Every failing field of a form, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message for a field, if it failed.
    pub fn get(&self, field: CustomerField) -> Option<&'static str> {
        self.0.iter().find(|e| e.field == field).map(|e| e.message)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

impl CustomerForm {
    pub fn new(
        nombre: impl Into<String>,
        direccion: impl Into<String>,
        comuna: impl Into<String>,
        telefono: impl Into<String>,
    ) -> Self {
        Self {
            nombre: nombre.into(),
            direccion: direccion.into(),
            comuna: comuna.into(),
            telefono: telefono.into(),
        }
    }

    pub fn value(&self, field: CustomerField) -> &str {
        match field {
            CustomerField::Nombre => &self.nombre,
            CustomerField::Direccion => &self.direccion,
            CustomerField::Comuna => &self.comuna,
            CustomerField::Telefono => &self.telefono,
        }
    }

    /// Check one field. Values are trimmed before checking.
    pub fn check(&self, field: CustomerField) -> Option<&'static str> {
        let value = self.value(field).trim();
        match field {
            CustomerField::Nombre => {
                if value.is_empty() {
                    Some("Ingresa tu nombre completo.")
                } else if !letters_and_spaces(value, 3, 60) {
                    Some("Solo letras/espacios (3–60).")
                } else {
                    None
                }
            }
            CustomerField::Direccion => {
                if value.is_empty() {
                    Some("Ingresa tu dirección.")
                } else if !is_address(value) {
                    Some("Dirección inválida (5–120).")
                } else {
                    None
                }
            }
            CustomerField::Comuna => {
                if value.is_empty() {
                    Some("Ingresa tu comuna.")
                } else if !letters_and_spaces(value, 3, 40) {
                    Some("Solo letras/espacios (3–40).")
                } else {
                    None
                }
            }
            CustomerField::Telefono => {
                if value.is_empty() {
                    Some("Ingresa tu teléfono.")
                } else if !is_chilean_mobile(value) {
                    Some("Formato válido: +569XXXXXXXX o 9XXXXXXXX.")
                } else {
                    None
                }
            }
        }
    }

    /// Check every field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let errors: Vec<FieldError> = CustomerField::ALL
            .iter()
            .filter_map(|&field| self.check(field).map(|message| FieldError { field, message }))
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }

    /// Delivery address as sent with the order: `"<direccion>, <comuna>"`.
    pub fn full_address(&self) -> String {
        format!("{}, {}", self.direccion.trim(), self.comuna.trim())
    }
}

const ACCENTED: &str = "ÁÉÍÓÚÑáéíóúñ";

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || ACCENTED.contains(c)
}

fn within(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.chars().count())
}

fn letters_and_spaces(value: &str, min: usize, max: usize) -> bool {
    within(value, min, max) && value.chars().all(|c| is_letter(c) || c.is_whitespace())
}

fn is_address(value: &str) -> bool {
    within(value, 5, 120)
        && value.chars().all(|c| {
            is_letter(c) || c.is_ascii_digit() || c == '_' || c.is_whitespace() || ".-#".contains(c)
        })
}

/// `+569XXXXXXXX`, `569XXXXXXXX`, `56 9XXXXXXXX` or `9XXXXXXXX`.
fn is_chilean_mobile(value: &str) -> bool {
    let local = |rest: &str| {
        rest.len() == 9 && rest.starts_with('9') && rest.bytes().all(|b| b.is_ascii_digit())
    };
    if local(value) {
        return true;
    }
    let Some(rest) = value.strip_prefix('+').unwrap_or(value).strip_prefix("56") else {
        return false;
    };
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_whitespace() => local(chars.as_str()),
        _ => local(rest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CustomerForm {
        CustomerForm::new("María Núñez", "Av. Grecia 1234 #5", "Ñuñoa", "+56912345678")
    }

    #[test]
    fn test_valid_form() {
        assert!(valid().validate().is_ok());
        assert_eq!(valid().full_address(), "Av. Grecia 1234 #5, Ñuñoa");
    }

    #[test]
    fn test_phone_formats() {
        for ok in ["+56912345678", "56912345678", "56 912345678", "912345678", " 912345678 "] {
            let form = CustomerForm { telefono: ok.into(), ..valid() };
            assert_eq!(form.check(CustomerField::Telefono), None, "{ok}");
        }
        for bad in ["12345678", "+5691234567", "812345678", "+56 9 1234 5678", "++56912345678"] {
            let form = CustomerForm { telefono: bad.into(), ..valid() };
            assert!(form.check(CustomerField::Telefono).is_some(), "{bad}");
        }
    }

    #[test]
    fn test_collects_every_error() {
        let errors = CustomerForm::new("Al", "", "Santiago 1", "12").validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get(CustomerField::Nombre), Some("Solo letras/espacios (3–60)."));
        assert_eq!(errors.get(CustomerField::Direccion), Some("Ingresa tu dirección."));
        assert!(errors.get(CustomerField::Comuna).is_some());
        assert!(errors.to_string().starts_with("nombre: "));
    }

    #[test]
    fn test_length_counts_characters() {
        let form = CustomerForm { nombre: "Ñoñ".into(), ..valid() };
        assert_eq!(form.check(CustomerField::Nombre), None);
        let form = CustomerForm { comuna: "a".repeat(41), ..valid() };
        assert!(form.check(CustomerField::Comuna).is_some());
    }
}
