// src/extractors/template.rs
use serde::{Deserialize, Serialize};

/// What a single cell of a row means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellRole {
    Label,
    Value,
    Question,
    Answer,
    Explanation,
}

/// One extraction unit inside a row, expressed as cell indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// `label` is looked up in the dictionary, `value` is written to the key.
    Pair { label: usize, value: usize },
    /// `question` is looked up; answer and explanation go to `<base>-answer`
    /// and `<base>-explanation`.
    Question {
        question: usize,
        answer: usize,
        explanation: Option<usize>,
    },
}

/// Row shape: a cell count and the role of each cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableShapeTemplate {
    pub arity: usize,
    pub roles: Vec<CellRole>,
}

impl TableShapeTemplate {
    /// `Label | Value`
    pub fn label_value() -> Self {
        Self { arity: 2, roles: vec![CellRole::Label, CellRole::Value] }
    }

    /// `Question | Answer | Explanation`
    pub fn question_answer() -> Self {
        Self {
            arity: 3,
            roles: vec![CellRole::Question, CellRole::Answer, CellRole::Explanation],
        }
    }

    /// `Label | Value | Label | Value`, both pairs independent.
    pub fn double_label_value() -> Self {
        Self {
            arity: 4,
            roles: vec![CellRole::Label, CellRole::Value, CellRole::Label, CellRole::Value],
        }
    }

    /// Groups the roles into slots. Fails with a reason when the role list is
    /// inconsistent (wrong length, a label without value, ...).
    pub fn slots(&self) -> Result<Vec<Slot>, String> {
        if self.roles.len() != self.arity {
            return Err(format!(
                "template declares arity {} but lists {} roles",
                self.arity,
                self.roles.len()
            ));
        }

        let mut slots = Vec::new();
        let mut idx = 0;
        while idx < self.roles.len() {
            match self.roles[idx] {
                CellRole::Label => {
                    if self.roles.get(idx + 1) != Some(&CellRole::Value) {
                        return Err(format!("label at cell {} is not followed by a value", idx));
                    }
                    slots.push(Slot::Pair { label: idx, value: idx + 1 });
                    idx += 2;
                }
                CellRole::Question => {
                    if self.roles.get(idx + 1) != Some(&CellRole::Answer) {
                        return Err(format!("question at cell {} is not followed by an answer", idx));
                    }
                    let explanation = (self.roles.get(idx + 2) == Some(&CellRole::Explanation)).then_some(idx + 2);
                    slots.push(Slot::Question { question: idx, answer: idx + 1, explanation });
                    idx += if explanation.is_some() { 3 } else { 2 };
                }
                other => {
                    return Err(format!("cell {} has role {:?} without a label or question", idx, other));
                }
            }
        }
        Ok(slots)
    }
}
