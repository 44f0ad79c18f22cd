use serde::{Deserialize, Serialize};

use super::batch::SizeQuantity;

/// Outcome of a completed cutting task, awaiting supervisor confirmation.
///
/// One per batch. Sewing cannot be assigned until the head of production
/// confirms the counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuttingResult {
    pub id: String,

    pub batch_id: String,

    /// The cutting task that produced this result.
    pub task_id: String,

    /// Pieces actually cut, per size.
    pub pieces_by_size: Vec<SizeQuantity>,

    /// Sum of `pieces_by_size`.
    pub total_pieces: u32,

    #[serde(default)]
    pub is_confirmed: bool,

    /// Supervisor who confirmed the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<String>,

    pub create_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip() {
        let r = CuttingResult {
            id: "cr1".into(),
            batch_id: "b1".into(),
            task_id: "t1".into(),
            pieces_by_size: vec![SizeQuantity { size: "M".into(), quantity: 58 }],
            total_pieces: 58,
            is_confirmed: false,
            confirmed_by: None,
            confirmed_at: None,
            create_at: "2026-08-01T00:00:00Z".into(),
        };
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"isConfirmed\":false"));
        assert!(!json.contains("\"confirmedBy\""));
        let back: CuttingResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.total_pieces, 58);
        assert!(!back.is_confirmed);
    }
}
