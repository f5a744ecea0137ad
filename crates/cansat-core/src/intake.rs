//! Interactive parameter intake over any line-oriented reader/writer pair.

use crate::error::IntakeError;
use crate::params::{ParamSpec, SimulationParameters, PARAMETERS};
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Interpret one line of operator input.
///
/// Blank input selects `default`; anything else must parse as an `f64`.
pub fn parse_input(raw: &str, default: f64) -> Result<f64, IntakeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(default);
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| IntakeError::InvalidNumber(trimmed.to_string()))
}

/// Prompt for one parameter until a number or a blank line is entered.
///
/// End of input yields the default so a closed stdin cannot loop forever.
pub fn prompt_f64<R: BufRead, W: Write>(reader: &mut R, writer: &mut W, spec: &ParamSpec) -> io::Result<f64> {
    let mut line = String::new();
    loop {
        write!(writer, "{} [{}]: ", spec.display_label(), spec.default)?;
        writer.flush()?;

        line.clear();
        if reader.read_line(&mut line)? == 0 {
            writeln!(writer)?;
            debug!(key = spec.key, "end of input, using default");
            return Ok(spec.default);
        }

        match parse_input(&line, spec.default) {
            Ok(value) => return Ok(value),
            Err(e) => writeln!(writer, "Invalid input: {e}. Enter a number or press Enter for the default.")?,
        }
    }
}

/// Run all eight prompts in order.
pub fn collect_parameters<R: BufRead, W: Write>(reader: &mut R, writer: &mut W) -> io::Result<SimulationParameters> {
    let mut values = [0.0; 8];
    for (slot, spec) in values.iter_mut().zip(PARAMETERS.iter()) {
        *slot = prompt_f64(reader, writer, spec)?;
    }
    Ok(SimulationParameters::from_values(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{DRY_MASS, HEADING};
    use std::io::Cursor;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("", 1.5), Ok(1.5));
        assert_eq!(parse_input("   \n", 1.5), Ok(1.5));
        assert_eq!(parse_input(" 42.5\n", 1.5), Ok(42.5));
        assert_eq!(parse_input("-3e2", 1.5), Ok(-300.0));
        assert_eq!(parse_input("ten", 1.5), Err(IntakeError::InvalidNumber("ten".into())));
    }

    #[test]
    fn test_prompt_reprompts_until_valid() {
        let mut input = Cursor::new("abc\n1,5\n0.75\n");
        let mut output = Vec::new();
        let value = prompt_f64(&mut input, &mut output, &DRY_MASS).unwrap();
        assert_eq!(value, 0.75);

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.matches("Dry mass (kg) [0.3]: ").count(), 3);
        assert_eq!(text.matches("Invalid input").count(), 2);
    }

    #[test]
    fn test_prompt_blank_and_eof_use_default() {
        let mut output = Vec::new();
        assert_eq!(prompt_f64(&mut Cursor::new("\n"), &mut output, &HEADING).unwrap(), 0.0);
        assert_eq!(prompt_f64(&mut Cursor::new(""), &mut output, &DRY_MASS).unwrap(), 0.3);
        assert_eq!(prompt_f64(&mut Cursor::new("oops\n"), &mut output, &DRY_MASS).unwrap(), 0.3);
    }

    #[test]
    fn test_collect_parameters() {
        // Negative mass is passed through untouched.
        let mut input = Cursor::new("85\n\n\n-1\n\n\n12\n");
        let mut output = Vec::new();
        let params = collect_parameters(&mut input, &mut output).unwrap();

        let expected = SimulationParameters {
            inclination: 85.0,
            dry_mass: -1.0,
            avg_thrust: 12.0,
            ..SimulationParameters::default()
        };
        assert_eq!(params, expected);
    }
}
