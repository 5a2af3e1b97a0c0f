/// Text typed for the next task, not yet submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputController {
    value: String,
}

impl InputController {
    pub fn set(&mut self, text: &str) {
        self.value = text.to_string();
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }
}
