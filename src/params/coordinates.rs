//! Rectangle list encoding for face and custom coordinates.

/// One or more `x,y,width,height` rectangles, encoded as a double array:
/// rect components joined with `,`, rects joined with `|`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coordinates {
    rects: Vec<[i32; 4]>,
}

impl Coordinates {
    pub fn new(rects: Vec<[i32; 4]>) -> Self {
        Self { rects }
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn to_wire(&self) -> String {
        self.rects
            .iter()
            .map(|r| {
                r.iter()
                    .map(|n| n.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl From<[i32; 4]> for Coordinates {
    fn from(rect: [i32; 4]) -> Self {
        Self { rects: vec![rect] }
    }
}

impl From<Vec<[i32; 4]>> for Coordinates {
    fn from(rects: Vec<[i32; 4]>) -> Self {
        Self { rects }
    }
}
