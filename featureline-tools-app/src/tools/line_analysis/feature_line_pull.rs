/*
This tool is part of the FeatureLine Tools geospatial analysis library.
Authors: FeatureLine Tools contributors
Created: 25/09/2026
Last Modified: 06/10/2026
License: MIT
*/

use crate::tools::*;
use featureline_common::algorithms::pull_line;
use featureline_common::configs::Configs;
use featureline_common::features::{FeatureStore, GeoJsonStore, OutputFeature, OutputLayer};
use featureline_common::utils::{get_formatted_elapsed_time, progress_percent};
use std::io::Error;
use std::time::Instant;

/// This tool pulls back the ends of lines, shortening each line by the pull
/// distance (`--dist`) at its start, its end, or both (`--pull_start`,
/// `--pull_end`; both are on by default). The distance can instead be read
/// per line from a numeric attribute (`--dist_field`); lines lacking a usable
/// value fall back to `--dist`. Lines that are not longer than the total
/// pulled length are left out of the output and counted.
pub struct FeatureLinePull {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl FeatureLinePull {
    pub fn new() -> FeatureLinePull {
        // public constructor
        let name = "FeatureLinePull".to_string();
        let toolbox = "Line Analysis".to_string();
        let description = "Shortens lines by pulling back their start and end points.".to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input Vector Lines File".to_owned(),
            flags: vec!["-i".to_owned(), "--input".to_owned()],
            description: "Input vector line file.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Vector(
                VectorGeometryType::Line,
            )),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Output Vector File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output vector line file.".to_owned(),
            parameter_type: ParameterType::NewFile(ParameterFileType::Vector(
                VectorGeometryType::Line,
            )),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Pull Distance".to_owned(),
            flags: vec!["--dist".to_owned()],
            description: "Distance each end is pulled back, in map units.".to_owned(),
            parameter_type: ParameterType::Float,
            default_value: Some("0.0".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Pull Distance Field".to_owned(),
            flags: vec!["--dist_field".to_owned()],
            description: "Optional numeric field holding a pull distance for each line.".to_owned(),
            parameter_type: ParameterType::VectorAttributeField(
                AttributeType::Any,
                "--input".to_owned(),
            ),
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Pull Start Point?".to_owned(),
            flags: vec!["--pull_start".to_owned()],
            description: "Pull back the start of each line.".to_owned(),
            parameter_type: ParameterType::Boolean,
            default_value: Some("true".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Pull End Point?".to_owned(),
            flags: vec!["--pull_end".to_owned()],
            description: "Pull back the end of each line.".to_owned(),
            parameter_type: ParameterType::Boolean,
            default_value: Some("true".to_owned()),
            optional: true,
        });

        let usage = example_usage(
            &name,
            "-i=trails.geojson -o=pulled.geojson --dist=5.0 --pull_end=false",
        );

        FeatureLinePull {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl FeatureLineTool for FeatureLinePull {
    fn get_tool_name(&self) -> String {
        self.name.clone()
    }

    fn get_tool_description(&self) -> String {
        self.description.clone()
    }

    fn get_tool_parameters(&self) -> String {
        parameters_to_json(&self.parameters)
    }

    fn get_example_usage(&self) -> String {
        self.example_usage.clone()
    }

    fn get_toolbox(&self) -> String {
        self.toolbox.clone()
    }

    fn run(&self, args: Vec<String>, configs: &Configs) -> Result<(), Error> {
        let mut input_file = String::new();
        let mut output_file = String::new();
        let mut pull_value = 0f64;
        let mut pull_field = String::new();
        let mut pull_start = true;
        let mut pull_end = true;

        // read the arguments
        for (flag_val, value) in parse_args(&args)? {
            if flag_val == "-i" || flag_val == "-input" {
                input_file = value;
            } else if flag_val == "-o" || flag_val == "-output" {
                output_file = value;
            } else if flag_val == "-dist" {
                pull_value = parse_value(&flag_val, &value)?;
            } else if flag_val == "-dist_field" {
                pull_field = value.trim().to_string();
            } else if flag_val == "-pull_start" {
                pull_start = parse_switch(&value);
            } else if flag_val == "-pull_end" {
                pull_end = parse_switch(&value);
            }
        }
        required(&input_file, "--input")?;
        required(&output_file, "--output")?;

        let verbose = configs.verbose_mode;
        if verbose {
            welcome(&self.get_tool_name());
        }

        let start = Instant::now();
        let input_file = resolve_path(&input_file, &configs.working_directory);
        let output_file = resolve_path(&output_file, &configs.working_directory);

        let store = GeoJsonStore::new();
        if verbose {
            println!("Reading data...");
        }
        let input = store.read_lines(&input_file)?;

        let mut output = OutputLayer::default();
        output.fields = input.fields();
        let num_features = input.features.len();
        let mut old_progress = 1usize;
        let mut too_short = 0usize;
        for (i, feature) in input.features.iter().enumerate() {
            let value = if pull_field.is_empty() {
                pull_value
            } else {
                feature.numeric_attribute(&pull_field).unwrap_or(pull_value)
            };
            match pull_line(&feature.geometry, value, pull_start, pull_end) {
                Some(geometry) => output.features.push(OutputFeature {
                    geometry,
                    attributes: feature.attributes.clone(),
                }),
                None => too_short += 1,
            }

            if verbose {
                let progress = progress_percent(i, num_features);
                if progress != old_progress {
                    println!("Progress: {}%", progress);
                    old_progress = progress;
                }
            }
        }

        if verbose {
            println!("Saving data...");
        }
        store.write_layer(&output_file, &output, configs.overwrite_output)?;

        if verbose {
            if too_short > 0 {
                println!(
                    "Warning: {} features were shorter than the pull value and were not output.",
                    too_short
                );
            }
            if input.skipped_records > 0 {
                println!(
                    "Warning: {} input records were not valid lines and were skipped.",
                    input.skipped_records
                );
            }
            let elapsed_time = get_formatted_elapsed_time(start);
            println!("{}", &format!("Elapsed Time: {}", elapsed_time));
        }

        Ok(())
    }
}
