//! The glyph shown on a node and how it is placed

/// One character and its placement on the matrix
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterState {
    /// ASCII code of the glyph
    pub glyph: u8,
    /// Offset from the matrix centre, y pointing up
    pub position: (f32, f32),
    pub scale: (f32, f32),
    /// Degrees, positive is counter-clockwise
    pub rotation: f32,
    pub opacity: f32,
}

impl Default for CharacterState {
    fn default() -> Self {
        Self::new()
    }
}

impl CharacterState {
    /// Invisible blank, the boot character
    pub const fn new() -> Self {
        Self {
            glyph: b' ',
            position: (0.0, 0.0),
            scale: (1.0, 1.0),
            rotation: 0.0,
            opacity: 0.0,
        }
    }

    /// Fully visible character at rest
    pub const fn visible(glyph: u8) -> Self {
        Self {
            glyph,
            opacity: 1.0,
            ..Self::new()
        }
    }

    /// Apply a transition pose on top of this state
    pub fn posed(&self, pose: &Pose) -> CharacterState {
        CharacterState {
            glyph: self.glyph,
            position: (self.position.0 + pose.offset.0, self.position.1 + pose.offset.1),
            scale: (self.scale.0 * pose.scale.0, self.scale.1 * pose.scale.1),
            rotation: self.rotation + pose.rotation,
            opacity: self.opacity * pose.opacity,
        }
    }
}

/// Per-frame adjustment a transition applies to one character
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pose {
    pub opacity: f32,
    pub rotation: f32,
    pub offset: (f32, f32),
    pub scale: (f32, f32),
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        opacity: 1.0,
        rotation: 0.0,
        offset: (0.0, 0.0),
        scale: (1.0, 1.0),
    };

    pub const HIDDEN: Pose = Pose {
        opacity: 0.0,
        ..Pose::IDENTITY
    };

    pub const fn with_opacity(opacity: f32) -> Self {
        Pose {
            opacity,
            ..Pose::IDENTITY
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boot_character_is_invisible() {
        let c = CharacterState::default();
        assert_eq!(c.glyph, b' ');
        assert_eq!(c.opacity, 0.0);
    }

    #[test]
    fn test_pose_combines() {
        let c = CharacterState::visible(b'A');
        let pose = Pose {
            opacity: 0.5,
            rotation: 90.0,
            offset: (2.0, -1.0),
            scale: (0.5, 1.0),
        };
        let posed = c.posed(&pose);
        assert_eq!(posed.opacity, 0.5);
        assert_eq!(posed.rotation, 90.0);
        assert_eq!(posed.position, (2.0, -1.0));
        assert_eq!(posed.scale, (0.5, 1.0));
        assert_eq!(posed.glyph, b'A');
    }
}
