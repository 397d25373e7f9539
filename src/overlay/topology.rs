//! Landmark topology and drawing styles
//!
//! Connector index pairs for the face outline subsets and the hand skeleton.
//! Indices refer to positions in the engine's landmark sets (478-point face
//! mesh, 21-point hand). The dense face tesselation is model data, not
//! pipeline logic, and is not embedded here; the highlighted subsets are.

/// RGBA stroke color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }
}

/// Stroke style for a connector set or point cloud.
///
/// `width` is the stroke width for lines and the radius for points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub color: Color,
    pub width: f32,
}

impl Style {
    pub const fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

/// A named connector set with the style it is drawn in
#[derive(Debug, Clone, Copy)]
pub struct ConnectorSet {
    pub name: &'static str,
    pub edges: &'static [(usize, usize)],
    pub style: Style,
}

/// Connectors on the subject's right side (reads red on screen)
pub const RIGHT_SIDE_STYLE: Style = Style::new(Color::rgb(0xFF, 0x30, 0x30), 4.0);
/// Connectors on the subject's left side (reads green on screen)
pub const LEFT_SIDE_STYLE: Style = Style::new(Color::rgb(0x30, 0xFF, 0x30), 4.0);
/// Face oval and lips
pub const CONTOUR_STYLE: Style = Style::new(Color::rgb(0xE0, 0xE0, 0xE0), 4.0);
/// Hand skeleton lines
pub const HAND_CONNECTOR_STYLE: Style = Style::new(Color::rgb(0x00, 0xFF, 0x00), 5.0);
/// Hand landmark points
pub const HAND_POINT_STYLE: Style = Style::new(Color::rgb(0xFF, 0x00, 0x00), 2.0);
/// Detector bounding boxes
pub const BOX_STYLE: Style = Style::new(Color::rgb(0x00, 0xFF, 0x00), 1.0);
/// Detector keypoint dots
pub const KEYPOINT_STYLE: Style = Style::new(Color::rgb(0xFF, 0x00, 0x00), 2.0);

/// Hand skeleton: wrist, thumb, four fingers, palm ring
pub const HAND_CONNECTIONS: &[(usize, usize)] = &[
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    (5, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    (9, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    (13, 17),
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
];

pub const RIGHT_EYE: &[(usize, usize)] = &[
    (33, 7),
    (7, 163),
    (163, 144),
    (144, 145),
    (145, 153),
    (153, 154),
    (154, 155),
    (155, 133),
    (33, 246),
    (246, 161),
    (161, 160),
    (160, 159),
    (159, 158),
    (158, 157),
    (157, 173),
    (173, 133),
];

pub const LEFT_EYE: &[(usize, usize)] = &[
    (263, 249),
    (249, 390),
    (390, 373),
    (373, 374),
    (374, 380),
    (380, 381),
    (381, 382),
    (382, 362),
    (263, 466),
    (466, 388),
    (388, 387),
    (387, 386),
    (386, 385),
    (385, 384),
    (384, 398),
    (398, 362),
];

pub const RIGHT_EYEBROW: &[(usize, usize)] = &[
    (46, 53),
    (53, 52),
    (52, 65),
    (65, 55),
    (70, 63),
    (63, 105),
    (105, 66),
    (66, 107),
];

pub const LEFT_EYEBROW: &[(usize, usize)] = &[
    (276, 283),
    (283, 282),
    (282, 295),
    (295, 285),
    (300, 293),
    (293, 334),
    (334, 296),
    (296, 336),
];

pub const LIPS: &[(usize, usize)] = &[
    (61, 146),
    (146, 91),
    (91, 181),
    (181, 84),
    (84, 17),
    (17, 314),
    (314, 405),
    (405, 321),
    (321, 375),
    (375, 291),
    (61, 185),
    (185, 40),
    (40, 39),
    (39, 37),
    (37, 0),
    (0, 267),
    (267, 269),
    (269, 270),
    (270, 409),
    (409, 291),
    (78, 95),
    (95, 88),
    (88, 178),
    (178, 87),
    (87, 14),
    (14, 317),
    (317, 402),
    (402, 318),
    (318, 324),
    (324, 308),
    (78, 191),
    (191, 80),
    (80, 81),
    (81, 82),
    (82, 13),
    (13, 312),
    (312, 311),
    (311, 310),
    (310, 415),
    (415, 308),
];

pub const FACE_OVAL: &[(usize, usize)] = &[
    (10, 338),
    (338, 297),
    (297, 332),
    (332, 284),
    (284, 251),
    (251, 389),
    (389, 356),
    (356, 454),
    (454, 323),
    (323, 361),
    (361, 288),
    (288, 397),
    (397, 365),
    (365, 379),
    (379, 378),
    (378, 400),
    (400, 377),
    (377, 152),
    (152, 148),
    (148, 176),
    (176, 149),
    (149, 150),
    (150, 136),
    (136, 172),
    (172, 58),
    (58, 132),
    (132, 93),
    (93, 234),
    (234, 127),
    (127, 162),
    (162, 21),
    (21, 54),
    (54, 103),
    (103, 67),
    (67, 109),
    (109, 10),
];

/// Face connector sets in draw order
pub const FACE_CONNECTOR_SETS: &[ConnectorSet] = &[
    ConnectorSet {
        name: "right_eye",
        edges: RIGHT_EYE,
        style: RIGHT_SIDE_STYLE,
    },
    ConnectorSet {
        name: "right_eyebrow",
        edges: RIGHT_EYEBROW,
        style: RIGHT_SIDE_STYLE,
    },
    ConnectorSet {
        name: "left_eye",
        edges: LEFT_EYE,
        style: LEFT_SIDE_STYLE,
    },
    ConnectorSet {
        name: "left_eyebrow",
        edges: LEFT_EYEBROW,
        style: LEFT_SIDE_STYLE,
    },
    ConnectorSet {
        name: "face_oval",
        edges: FACE_OVAL,
        style: CONTOUR_STYLE,
    },
    ConnectorSet {
        name: "lips",
        edges: LIPS,
        style: CONTOUR_STYLE,
    },
];
