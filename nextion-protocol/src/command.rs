//! ASCII instructions sent to the display
//!
//! Each function formats one instruction into a bounded [`Command`] string.
//! The terminator is not included; the transmitter appends
//! [`TERMINATOR`](crate::codes::TERMINATOR) after every instruction.

use core::fmt::Write;

use heapless::String;

use crate::codes::ALL_COMPONENTS_ID;
use crate::color::Rgb565;

/// Longest instruction that can be formatted
pub const MAX_COMMAND_LEN: usize = 128;

/// A formatted instruction, without terminator
pub type Command = String<MAX_COMMAND_LEN>;

/// Errors that can occur while formatting an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Component or property name is empty or contains a separator
    ///
    /// A component may carry one page prefix (`page1.t0`); properties may not.
    InvalidName,
    /// Formatted instruction exceeds [`MAX_COMMAND_LEN`]
    TooLong,
}

/// Which instruction results the display reports back (`bkcmd`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReturnLevel {
    /// Never send a result
    Off,
    /// Only report successful instructions
    OnSuccess,
    /// Only report failed instructions
    #[default]
    OnFailure,
    /// Report every instruction
    Always,
}

impl ReturnLevel {
    /// Value assigned to `bkcmd`
    pub fn to_byte(self) -> u8 {
        match self {
            ReturnLevel::Off => 0,
            ReturnLevel::OnSuccess => 1,
            ReturnLevel::OnFailure => 2,
            ReturnLevel::Always => 3,
        }
    }
}

fn check_name(name: &str) -> Result<&str, CommandError> {
    let invalid = |c: char| c.is_whitespace() || matches!(c, '.' | '"' | '=' | ',');
    if name.is_empty() || name.contains(invalid) {
        return Err(CommandError::InvalidName);
    }
    Ok(name)
}

/// Component names may be qualified with their page, as in `page1.t0`
fn check_component(component: &str) -> Result<&str, CommandError> {
    if let Some((page, name)) = component.split_once('.') {
        check_name(page)?;
        check_name(name)?;
        return Ok(component);
    }
    check_name(component)
}

fn format(args: core::fmt::Arguments<'_>) -> Result<Command, CommandError> {
    let mut command = Command::new();
    command.write_fmt(args).map_err(|_| CommandError::TooLong)?;
    Ok(command)
}

fn flag(value: bool) -> u8 {
    value as u8
}

/// Bring a component to the front and redraw it (`ref`)
pub fn refresh(component: &str) -> Result<Command, CommandError> {
    format(format_args!("ref {}", check_component(component)?))
}

/// Show or hide a component (`vis`)
pub fn set_visibility(component: &str, visible: bool) -> Result<Command, CommandError> {
    format(format_args!("vis {},{}", check_component(component)?, flag(visible)))
}

/// Show or hide every component on the current page
pub fn set_visibility_all(visible: bool) -> Result<Command, CommandError> {
    format(format_args!("vis {},{}", ALL_COMPONENTS_ID, flag(visible)))
}

/// Enable or disable touch events for a component (`tsw`)
pub fn set_touchable(component: &str, touchable: bool) -> Result<Command, CommandError> {
    format(format_args!("tsw {},{}", check_component(component)?, flag(touchable)))
}

/// Enable or disable touch events for every component on the current page
pub fn set_touchable_all(touchable: bool) -> Result<Command, CommandError> {
    format(format_args!("tsw {},{}", ALL_COMPONENTS_ID, flag(touchable)))
}

/// Assign a quoted text to a component attribute
///
/// Double quotes and backslashes in `text` are escaped.
pub fn set_property_text(
    component: &str,
    property: &str,
    text: &str,
) -> Result<Command, CommandError> {
    let mut command = format(format_args!(
        "{}.{}=\"",
        check_component(component)?,
        check_name(property)?
    ))?;

    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            command.push('\\').map_err(|_| CommandError::TooLong)?;
        }
        command.push(c).map_err(|_| CommandError::TooLong)?;
    }
    command.push('"').map_err(|_| CommandError::TooLong)?;

    Ok(command)
}

/// Assign a number to a component attribute
pub fn set_property_number(
    component: &str,
    property: &str,
    number: i32,
) -> Result<Command, CommandError> {
    format(format_args!(
        "{}.{}={}",
        check_component(component)?,
        check_name(property)?,
        number
    ))
}

/// Assign a color to a component attribute such as `bco` or `pco`
pub fn set_property_color(
    component: &str,
    property: &str,
    color: Rgb565,
) -> Result<Command, CommandError> {
    set_property_number(component, property, color.raw() as i32)
}

/// Set the `txt` attribute
pub fn set_text(component: &str, text: &str) -> Result<Command, CommandError> {
    set_property_text(component, "txt", text)
}

/// Set the `val` attribute
pub fn set_value(component: &str, number: i32) -> Result<Command, CommandError> {
    set_property_number(component, "val", number)
}

/// Set the `val` attribute to 0 or 1
pub fn set_boolean(component: &str, value: bool) -> Result<Command, CommandError> {
    set_property_number(component, "val", flag(value) as i32)
}

/// Ask for the value of a component attribute (`get`)
///
/// The display replies with a text or number frame, depending on the
/// attribute type.
pub fn get_property(component: &str, property: &str) -> Result<Command, CommandError> {
    format(format_args!(
        "get {}.{}",
        check_component(component)?,
        check_name(property)?
    ))
}

/// Ask for the `txt` attribute
pub fn get_text(component: &str) -> Result<Command, CommandError> {
    get_property(component, "txt")
}

/// Ask for the `val` attribute
pub fn get_value(component: &str) -> Result<Command, CommandError> {
    get_property(component, "val")
}

/// Ask for the id of the active page (`sendme`)
pub fn get_page() -> Result<Command, CommandError> {
    format(format_args!("sendme"))
}

/// Change the active page
pub fn set_page(page_id: u8) -> Result<Command, CommandError> {
    format(format_args!("page {}", page_id))
}

/// Redraw the current page
pub fn refresh_page() -> Result<Command, CommandError> {
    format(format_args!("ref 0"))
}

/// Choose which instruction results the display reports
pub fn set_return_level(level: ReturnLevel) -> Result<Command, CommandError> {
    format(format_args!("bkcmd={}", level.to_byte()))
}

/// Put the display to sleep or wake it up
pub fn set_sleep(asleep: bool) -> Result<Command, CommandError> {
    format(format_args!("sleep={}", flag(asleep)))
}

/// Set backlight brightness in percent, clamped to 100
pub fn set_brightness(percent: u8) -> Result<Command, CommandError> {
    format(format_args!("dim={}", percent.min(100)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_commands() {
        assert_eq!(refresh("b0").unwrap(), "ref b0");
        assert_eq!(set_visibility("b0", true).unwrap(), "vis b0,1");
        assert_eq!(set_visibility("b0", false).unwrap(), "vis b0,0");
        assert_eq!(set_visibility_all(false).unwrap(), "vis 255,0");
        assert_eq!(set_touchable("t1", false).unwrap(), "tsw t1,0");
        assert_eq!(set_touchable_all(true).unwrap(), "tsw 255,1");
    }

    #[test]
    fn test_property_commands() {
        assert_eq!(set_text("t0", "Lisbon").unwrap(), "t0.txt=\"Lisbon\"");
        assert_eq!(set_value("n0", -21).unwrap(), "n0.val=-21");
        assert_eq!(set_boolean("c0", true).unwrap(), "c0.val=1");
        assert_eq!(
            set_property_number("h0", "maxval", 200).unwrap(),
            "h0.maxval=200"
        );
        assert_eq!(
            set_property_color("t0", "bco", Rgb565::RED).unwrap(),
            "t0.bco=63488"
        );
    }

    #[test]
    fn test_text_escaping() {
        assert_eq!(
            set_text("t0", r#"say "hi" \o/"#).unwrap(),
            r#"t0.txt="say \"hi\" \\o/""#
        );
    }

    #[test]
    fn test_system_commands() {
        assert_eq!(set_page(7).unwrap(), "page 7");
        assert_eq!(refresh_page().unwrap(), "ref 0");
        assert_eq!(set_return_level(ReturnLevel::Always).unwrap(), "bkcmd=3");
        assert_eq!(set_return_level(ReturnLevel::default()).unwrap(), "bkcmd=2");
        assert_eq!(set_sleep(true).unwrap(), "sleep=1");
        assert_eq!(set_brightness(40).unwrap(), "dim=40");
        assert_eq!(set_brightness(250).unwrap(), "dim=100");
    }

    #[test]
    fn test_invalid_names() {
        assert_eq!(refresh(""), Err(CommandError::InvalidName));
        assert_eq!(refresh("b 0"), Err(CommandError::InvalidName));
        assert_eq!(set_value("n0.val.x", 1), Err(CommandError::InvalidName));
        assert_eq!(set_value(".n0", 1), Err(CommandError::InvalidName));
        assert_eq!(set_value("page1.", 1), Err(CommandError::InvalidName));
        assert_eq!(
            set_property_number("n0", "val.x", 1),
            Err(CommandError::InvalidName)
        );
        assert_eq!(
            set_property_text("t0", "t\"x", ""),
            Err(CommandError::InvalidName)
        );
    }

    #[test]
    fn test_page_qualified_components() {
        assert_eq!(set_text("page1.t0", "Faro").unwrap(), "page1.t0.txt=\"Faro\"");
        assert_eq!(set_value("page1.n0", 3).unwrap(), "page1.n0.val=3");
        assert_eq!(set_visibility("main.b0", false).unwrap(), "vis main.b0,0");
        assert_eq!(get_value("page1.n0").unwrap(), "get page1.n0.val");
    }

    #[test]
    fn test_query_commands() {
        assert_eq!(get_text("t0").unwrap(), "get t0.txt");
        assert_eq!(get_value("n0").unwrap(), "get n0.val");
        assert_eq!(get_property("h0", "maxval").unwrap(), "get h0.maxval");
        assert_eq!(get_page().unwrap(), "sendme");
        assert_eq!(get_text("t 0"), Err(CommandError::InvalidName));
    }

    #[test]
    fn test_too_long() {
        let text = "x".repeat(MAX_COMMAND_LEN);
        assert_eq!(set_text("t0", &text), Err(CommandError::TooLong));

        let fits = "x".repeat(MAX_COMMAND_LEN - "t0.txt=\"\"".len());
        assert_eq!(set_text("t0", &fits).unwrap().len(), MAX_COMMAND_LEN);
    }
}
