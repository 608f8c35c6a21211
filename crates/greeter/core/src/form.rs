// Greeter
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! The name form. Its single field is required: an empty value never
//! produces a submission.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Please fill out this field.")]
    Required,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameForm {
    value: String,
}

impl NameForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn insert(&mut self, c: char) {
        self.value.push(c);
    }

    pub fn backspace(&mut self) {
        self.value.pop();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Validate and hand out the submitted name. The field keeps its value.
    pub fn submit(&self) -> Result<String, FormError> {
        if self.value.is_empty() {
            return Err(FormError::Required);
        }
        Ok(self.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_field_is_rejected() {
        let form = NameForm::new();
        assert_eq!(form.submit(), Err(FormError::Required));
    }

    #[test]
    fn test_editing() {
        let mut form = NameForm::new();
        for c in "Alicex".chars() {
            form.insert(c);
        }
        form.backspace();
        assert_eq!(form.submit(), Ok("Alice".to_string()));
        assert_eq!(form.value(), "Alice");

        form.clear();
        assert_eq!(form.submit(), Err(FormError::Required));
    }

    #[test]
    fn test_whitespace_counts_as_filled() {
        let mut form = NameForm::new();
        form.set_value("  ");
        assert_eq!(form.submit(), Ok("  ".to_string()));
    }
}
