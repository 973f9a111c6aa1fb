//! Configuration providers: flag/file driven and interactive prompts.
//!
//! Both walk the same question sequence (sensor count, names, state meanings
//! per sensor, fail meanings). Answers already present in the run settings are
//! used as is. For the rest, [`ArgsProvider`] fails with an invalid-input error
//! while [`PromptSession`] asks on its reader.

use std::io::{BufRead, Write};

use sensorkit_table::{
    ConfigurationProvider, EnumCollectOutcome, Result, SpecFaultLabels, SpecSensor,
    SpecTableConfig, TableError, derive_header_template, parse_sensor_count,
};

use crate::config::SpecRunSettings;

/// Answer typed to end an interactive session.
pub const C_ANSWER_CANCEL: &str = ":q";

/// Where missing answers come from.
trait AnswerSource {
    /// Answer `question`; `None` means the user cancelled.
    fn ask(&mut self, question: &str, default: Option<&str>) -> Result<Option<String>>;

    /// Handle a rejected answer; returning `Ok` asks again.
    fn reject(&mut self, err: TableError) -> Result<()>;
}

////////////////////////////////////////////////////////////////////////////////
// #region ArgsProvider

/// Non-interactive provider built from flags and the config file.
#[derive(Debug, Clone)]
pub struct ArgsProvider {
    settings: SpecRunSettings,
}

impl ArgsProvider {
    pub fn new(settings: SpecRunSettings) -> Self {
        Self { settings }
    }
}

struct NoAnswers;

impl AnswerSource for NoAnswers {
    fn ask(&mut self, question: &str, default: Option<&str>) -> Result<Option<String>> {
        match default {
            Some(c_default) => Ok(Some(c_default.to_string())),
            None => Err(TableError::InvalidInput(format!(
                "no answer for {question:?}; pass it as a flag, in --config, or use --interactive."
            ))),
        }
    }

    fn reject(&mut self, err: TableError) -> Result<()> {
        Err(err)
    }
}

impl ConfigurationProvider for ArgsProvider {
    fn collect(&mut self) -> Result<EnumCollectOutcome> {
        collect_with(&self.settings, &mut NoAnswers)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PromptSession

/// Interactive provider asking for missing answers line by line.
///
/// End of input or `:q` cancels. An empty answer takes the shown default, or
/// asks again when there is none.
pub struct PromptSession<R, W> {
    settings: SpecRunSettings,
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> PromptSession<R, W> {
    pub fn new(settings: SpecRunSettings, reader: R, writer: W) -> Self {
        Self {
            settings,
            reader,
            writer,
        }
    }

    /// Consume the session, returning its writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

struct PromptAnswers<'a, R, W> {
    reader: &'a mut R,
    writer: &'a mut W,
}

impl<R: BufRead, W: Write> AnswerSource for PromptAnswers<'_, R, W> {
    fn ask(&mut self, question: &str, default: Option<&str>) -> Result<Option<String>> {
        loop {
            match default {
                Some(c_default) => write!(self.writer, "{question} [{c_default}] "),
                None => write!(self.writer, "{question} "),
            }
            .and_then(|()| self.writer.flush())
            .map_err(derive_prompt_error)?;

            let mut c_line = String::new();
            let n_bytes = self
                .reader
                .read_line(&mut c_line)
                .map_err(derive_prompt_error)?;
            if n_bytes == 0 {
                writeln!(self.writer).map_err(derive_prompt_error)?;
                return Ok(None);
            }

            let c_answer = c_line.trim();
            if c_answer == C_ANSWER_CANCEL {
                return Ok(None);
            }
            if !c_answer.is_empty() {
                return Ok(Some(c_answer.to_string()));
            }
            if let Some(c_default) = default {
                return Ok(Some(c_default.to_string()));
            }
        }
    }

    fn reject(&mut self, err: TableError) -> Result<()> {
        writeln!(self.writer, "error: {err}").map_err(derive_prompt_error)
    }
}

impl<R: BufRead, W: Write> ConfigurationProvider for PromptSession<R, W> {
    fn collect(&mut self) -> Result<EnumCollectOutcome> {
        let mut answers = PromptAnswers {
            reader: &mut self.reader,
            writer: &mut self.writer,
        };
        collect_with(&self.settings, &mut answers)
    }
}

fn derive_prompt_error(err: std::io::Error) -> TableError {
    TableError::InvalidInput(format!("prompt I/O failed: {err}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region QuestionSequence

fn collect_with(
    settings: &SpecRunSettings,
    source: &mut dyn AnswerSource,
) -> Result<EnumCollectOutcome> {
    let n_sensors = match &settings.sensor_count {
        Some(c_count) => parse_sensor_count(c_count)?,
        None if !settings.sensors.is_empty() => settings.sensors.len(),
        None => loop {
            let Some(c_count) = source.ask("Number of sensors:", None)? else {
                return Ok(EnumCollectOutcome::Cancelled);
            };
            match parse_sensor_count(&c_count) {
                Ok(n_count) => break n_count,
                Err(err) => source.reject(err)?,
            }
        },
    };
    if settings.sensors.len() > n_sensors {
        return Err(TableError::InvalidInput(format!(
            "{} sensors given for a sensor count of {n_sensors}.",
            settings.sensors.len()
        )));
    }

    let header_template = derive_header_template(settings.header_style.into());
    let mut l_names = Vec::with_capacity(n_sensors);
    for n_idx in 0..n_sensors {
        let c_name = match settings.sensors.get(n_idx) {
            Some(draft) => {
                let c_name = draft.name.trim().to_uppercase();
                header_template.validate_state_name(n_idx, &c_name)?;
                c_name
            }
            None => loop {
                let c_question = format!("Name of sensor {}:", n_idx + 1);
                let c_default = format!("Sensor{}", n_idx + 1);
                let Some(c_answer) = source.ask(&c_question, Some(c_default.as_str()))? else {
                    return Ok(EnumCollectOutcome::Cancelled);
                };
                let c_name = c_answer.trim().to_uppercase();
                match header_template.validate_state_name(n_idx, &c_name) {
                    Ok(()) => break c_name,
                    Err(err) => source.reject(err)?,
                }
            },
        };
        l_names.push(c_name);
    }

    let mut l_sensors = Vec::with_capacity(n_sensors);
    for (n_idx, c_name) in l_names.iter().enumerate() {
        let labels_known = settings
            .sensors
            .get(n_idx)
            .and_then(|draft| draft.labels.clone());
        let (c_label0, c_label1) = match labels_known {
            Some(labels) => labels,
            None => {
                let Some(c_label0) =
                    source.ask(&format!("What does 0 mean for {c_name}?"), None)?
                else {
                    return Ok(EnumCollectOutcome::Cancelled);
                };
                let Some(c_label1) =
                    source.ask(&format!("What does 1 mean for {c_name}?"), None)?
                else {
                    return Ok(EnumCollectOutcome::Cancelled);
                };
                (c_label0, c_label1)
            }
        };
        l_sensors.push(SpecSensor::new(c_name, &c_label0, &c_label1)?);
    }

    let (c_fail0, c_fail1) = match &settings.fail_labels {
        Some(labels) => labels.clone(),
        None => {
            let Some(c_fail0) = source.ask("What does 0 mean for FAIL?", None)? else {
                return Ok(EnumCollectOutcome::Cancelled);
            };
            let Some(c_fail1) = source.ask("What does 1 mean for FAIL?", None)? else {
                return Ok(EnumCollectOutcome::Cancelled);
            };
            (c_fail0, c_fail1)
        }
    };

    let config = SpecTableConfig::new(
        l_sensors,
        SpecFaultLabels::new(&c_fail0, &c_fail1)?,
        header_template,
    )?;
    Ok(EnumCollectOutcome::Ready(config))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::path::PathBuf;

    use sensorkit_table::SpecRenderOptions;

    use super::*;
    use crate::cli::HeaderStyleArg;
    use crate::config::SpecSensorDraft;

    fn settings_empty() -> SpecRunSettings {
        SpecRunSettings {
            sensor_count: None,
            sensors: Vec::new(),
            fail_labels: None,
            header_style: HeaderStyleArg::Plain,
            render_options: SpecRenderOptions::default(),
            sheet_name: "Sheet1".to_string(),
            path_file_out: PathBuf::from("out.xlsx"),
            if_interactive: true,
        }
    }

    fn run_session(settings: SpecRunSettings, input: &str) -> (EnumCollectOutcome, String) {
        let mut session = PromptSession::new(settings, Cursor::new(input.to_string()), Vec::new());
        let outcome = session.collect().expect("collect");
        let c_output = String::from_utf8(session.into_writer()).expect("utf8");
        (outcome, c_output)
    }

    #[test]
    fn test_prompt_session_collects_everything() {
        let (outcome, c_output) = run_session(
            settings_empty(),
            "2\nA\n\nup\ndown\nclosed\nopen\nOK\nFAULT\n",
        );

        let EnumCollectOutcome::Ready(config) = outcome else {
            panic!("expected a ready configuration");
        };
        assert_eq!(config.sensor_count(), 2);
        assert_eq!(config.sensors[0].name, "A");
        assert_eq!(config.sensors[0].state1_label, "DOWN");
        assert_eq!(config.sensors[1].name, "SENSOR2");
        assert_eq!(config.fault_labels.fail1_label, "FAULT");
        assert!(c_output.contains("What does 0 mean for SENSOR2?"));
        assert!(c_output.contains("What does 1 mean for FAIL?"));
    }

    #[test]
    fn test_prompt_session_reasks_on_bad_count_and_empty_label() {
        let (outcome, c_output) =
            run_session(settings_empty(), "two\n0\n1\nX\n\nON\nOFF\nok\nbad\n");

        let EnumCollectOutcome::Ready(config) = outcome else {
            panic!("expected a ready configuration");
        };
        assert_eq!(config.sensors[0].state0_label, "ON");
        assert_eq!(c_output.matches("error: invalid input").count(), 2);
        assert_eq!(c_output.matches("What does 0 mean for X?").count(), 2);
    }

    #[test]
    fn test_prompt_session_reasks_name_with_fail_marker() {
        let settings = SpecRunSettings {
            header_style: HeaderStyleArg::Stacked,
            ..settings_empty()
        };
        let (outcome, c_output) =
            run_session(settings, "1
failsafe
door
shut
ajar
OK
FAULT
");

        let EnumCollectOutcome::Ready(config) = outcome else {
            panic!("expected a ready configuration");
        };
        assert_eq!(config.sensors[0].name, "DOOR");
        assert_eq!(c_output.matches("Name of sensor 1:").count(), 2);
        assert_eq!(c_output.matches("error: invalid input").count(), 1);
    }

    #[test]
    fn test_args_provider_rejects_name_with_fail_marker() {
        let settings = SpecRunSettings {
            sensors: vec![SpecSensorDraft {
                name: "failsafe".to_string(),
                labels: Some(("UP".to_string(), "DOWN".to_string())),
            }],
            fail_labels: Some(("OK".to_string(), "FAULT".to_string())),
            header_style: HeaderStyleArg::Stacked,
            if_interactive: false,
            ..settings_empty()
        };
        assert!(matches!(
            ArgsProvider::new(settings).collect(),
            Err(TableError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_prompt_session_cancels_on_quit_and_eof() {
        let (outcome, _) = run_session(settings_empty(), "1\nA\n:q\n");
        assert_eq!(outcome, EnumCollectOutcome::Cancelled);

        let (outcome, _) = run_session(settings_empty(), "1\nA\nON\n");
        assert_eq!(outcome, EnumCollectOutcome::Cancelled);
    }

    #[test]
    fn test_prompt_session_skips_known_answers() {
        let settings = SpecRunSettings {
            sensors: vec![SpecSensorDraft {
                name: "door".to_string(),
                labels: Some(("shut".to_string(), "ajar".to_string())),
            }],
            ..settings_empty()
        };
        let (outcome, c_output) = run_session(settings, "fine\nbroken\n");

        let EnumCollectOutcome::Ready(config) = outcome else {
            panic!("expected a ready configuration");
        };
        assert_eq!(config.sensors[0].name, "DOOR");
        assert_eq!(config.fault_labels.fail0_label, "fine");
        assert!(!c_output.contains("Number of sensors"));
    }

    #[test]
    fn test_args_provider_requires_labels() {
        let settings = SpecRunSettings {
            sensor_count: Some("1".to_string()),
            fail_labels: Some(("OK".to_string(), "FAULT".to_string())),
            if_interactive: false,
            ..settings_empty()
        };
        assert!(matches!(
            ArgsProvider::new(settings).collect(),
            Err(TableError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_args_provider_rejects_bad_count() {
        for c_count in ["0", "-3", "2.5", "abc"] {
            let settings = SpecRunSettings {
                sensor_count: Some(c_count.to_string()),
                ..settings_empty()
            };
            assert!(matches!(
                ArgsProvider::new(settings).collect(),
                Err(TableError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_args_provider_rejects_more_sensors_than_count() {
        let settings = SpecRunSettings {
            sensor_count: Some("1".to_string()),
            sensors: vec![
                SpecSensorDraft {
                    name: "A".to_string(),
                    labels: Some(("UP".to_string(), "DOWN".to_string())),
                },
                SpecSensorDraft {
                    name: "B".to_string(),
                    labels: Some(("UP".to_string(), "DOWN".to_string())),
                },
            ],
            fail_labels: Some(("OK".to_string(), "FAULT".to_string())),
            ..settings_empty()
        };
        assert!(ArgsProvider::new(settings).collect().is_err());
    }

    #[test]
    fn test_args_provider_ready_with_default_names() {
        let settings = SpecRunSettings {
            sensors: vec![SpecSensorDraft {
                name: "A".to_string(),
                labels: Some(("UP".to_string(), "DOWN".to_string())),
            }],
            fail_labels: Some(("OK".to_string(), "FAULT".to_string())),
            header_style: HeaderStyleArg::Stacked,
            ..settings_empty()
        };
        let EnumCollectOutcome::Ready(config) =
            ArgsProvider::new(settings).collect().expect("collect")
        else {
            panic!("expected a ready configuration");
        };
        assert_eq!(config.sensor_count(), 1);
        assert_eq!(config.header_template.state, "{name}\nMCU{n}");
    }
}
