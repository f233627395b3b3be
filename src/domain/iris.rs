use serde::{Deserialize, Serialize};

/// One flower's measurements, all in centimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrisFeatures {
    pub sepal_length_cm: f64,
    pub sepal_width_cm: f64,
    pub petal_length_cm: f64,
    pub petal_width_cm: f64,
}

impl IrisFeatures {
    pub fn new(
        sepal_length_cm: f64,
        sepal_width_cm: f64,
        petal_length_cm: f64,
        petal_width_cm: f64,
    ) -> Self {
        Self {
            sepal_length_cm,
            sepal_width_cm,
            petal_length_cm,
            petal_width_cm,
        }
    }

    /// Feature vector in model input order
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.sepal_length_cm,
            self.sepal_width_cm,
            self.petal_length_cm,
            self.petal_width_cm,
        ]
    }
}

/// Iris species predicted by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrisClass {
    Setosa,
    Versicolour,
    Virginica,
}

impl IrisClass {
    /// Output index order of the classifier head
    pub const ALL: [IrisClass; 3] = [
        IrisClass::Setosa,
        IrisClass::Versicolour,
        IrisClass::Virginica,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        match self {
            IrisClass::Setosa => 0,
            IrisClass::Versicolour => 1,
            IrisClass::Virginica => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IrisClass::Setosa => "Iris Setosa",
            IrisClass::Versicolour => "Iris Versicolour",
            IrisClass::Virginica => "Iris Virginica",
        }
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.as_str()).collect()
    }
}

impl std::fmt::Display for IrisClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for IrisClass {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_and_label_table_agree() {
        for (i, class) in IrisClass::ALL.iter().enumerate() {
            assert_eq!(class.index(), i);
            assert_eq!(IrisClass::from_index(i), Some(*class));
        }
        assert_eq!(IrisClass::from_index(3), None);
        assert_eq!(
            IrisClass::labels(),
            vec!["Iris Setosa", "Iris Versicolour", "Iris Virginica"]
        );
    }

    #[test]
    fn features_deserialize_from_request_keys() {
        let raw = r#"{"sepal_length_cm":5.1,"sepal_width_cm":3.5,"petal_length_cm":1.4,"petal_width_cm":0.2}"#;
        let features: IrisFeatures = serde_json::from_str(raw).unwrap();
        assert_eq!(features.to_vec(), vec![5.1, 3.5, 1.4, 0.2]);
    }

    #[test]
    fn class_serializes_as_display_label() {
        let json = serde_json::to_string(&[IrisClass::Setosa, IrisClass::Virginica]).unwrap();
        assert_eq!(json, r#"["Iris Setosa","Iris Virginica"]"#);
    }
}
