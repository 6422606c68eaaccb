use cellpack_common::Color;

/// A high-level request produced by the viewer panel or keyboard.
///
/// The application consumes actions, never raw widget events.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Rebuild the pack from the current dimension fields.
    Generate,
    /// Change the scene background.
    SetBackground(Color),
    /// Draw cells as edges only.
    SetWireframe(bool),
    /// Switch between unlit and lit cell shading.
    SetLighting(bool),
    /// Show or hide the floor grid and axes.
    SetHelpers(bool),
    /// Return the camera to its initial pose.
    ResetCamera,
    /// Toggle the side panel.
    TogglePanel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_action_carries_color() {
        let a = Action::SetBackground(Color::from_hex("#18142c").unwrap());
        match a {
            Action::SetBackground(c) => assert_eq!(c.to_hex(), "#18142c"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn toggles_are_constructible() {
        assert!(matches!(Action::SetWireframe(true), Action::SetWireframe(true)));
        assert!(matches!(Action::SetLighting(false), Action::SetLighting(false)));
        assert_ne!(Action::Generate, Action::ResetCamera);
    }
}
