use std::io::{self, BufRead, Write};

use crate::dashboard::WeatherSource;
use crate::error::UpstreamError;
use crate::features::{Feature, Observation};

/// Prints `prompt` and reads one trimmed line. `None` at end of input.
pub fn read_line<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<Option<String>> {
    write!(output, "{prompt}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Prompts until a number is entered. `None` at end of input.
pub fn get_input<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<Option<f64>> {
    loop {
        let Some(line) = read_line(input, output, prompt)? else {
            return Ok(None);
        };
        match line.parse::<f64>() {
            Ok(num) if num.is_finite() => return Ok(Some(num)),
            _ => writeln!(output, "Please enter a valid number")?,
        }
    }
}

/// Weather source that asks the operator to type the current readings.
pub struct PromptedWeather<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptedWeather<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Reads a line through the same streams the readings come from.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        read_line(&mut self.input, &mut self.output, prompt)
    }
}

impl<R: BufRead, W: Write> WeatherSource for PromptedWeather<R, W> {
    fn fetch(&mut self, location: &str) -> Result<Observation, UpstreamError> {
        let unavailable = |e: io::Error| UpstreamError::Unavailable(e.to_string());
        writeln!(self.output, "Current conditions in {location}:").map_err(unavailable)?;

        let mut readings = [0.0; 5];
        for feature in Feature::ALL {
            let prompt = format!("  {} ({}): ", feature, feature.unit());
            readings[feature.index()] = get_input(&mut self.input, &mut self.output, &prompt)
                .map_err(unavailable)?
                .ok_or_else(|| UpstreamError::Unavailable("input closed".to_string()))?;
        }

        let [temperature, humidity, pressure, wind_speed, cloud_cover] = readings;
        Ok(Observation {
            location_name: Some(location.to_string()),
            ..Observation::from_readings(temperature, humidity, pressure, wind_speed, cloud_cover)
        })
    }
}
