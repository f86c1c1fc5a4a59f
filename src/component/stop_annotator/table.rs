use serde::Serialize;

/// 每個區段一列的暫停時間（相對於區段開頭的秒數）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StopTimeTable {
    rows: Vec<Vec<f64>>,
}

impl StopTimeTable {
    #[must_use]
    pub const fn new(rows: Vec<Vec<f64>>) -> Self {
        Self { rows }
    }

    /// `segment_count` 列空白（沒有設定暫停標誌時）
    #[must_use]
    pub fn empty(segment_count: usize) -> Self {
        Self {
            rows: vec![Vec::new(); segment_count],
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 嵌入播放頁面腳本用的 JSON 陣列
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_json() {
        let table = StopTimeTable::new(vec![vec![3.53, 7.0], vec![], vec![12.25]]);
        assert_eq!(table.to_json().unwrap(), "[[3.53,7.0],[],[12.25]]");
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_empty_rows() {
        let table = StopTimeTable::empty(2);
        assert_eq!(table.to_json().unwrap(), "[[],[]]");
        assert!(!table.is_empty());
    }
}
