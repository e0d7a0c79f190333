/*
This tool is part of the FeatureLine Tools geospatial analysis library.
Authors: FeatureLine Tools contributors
Created: 21/09/2026
Last Modified: 06/10/2026
License: MIT
*/

use crate::tools::*;
use featureline_common::algorithms::assemble_corridors;
use featureline_common::configs::Configs;
use featureline_common::features::{
    AttributeField, FeatureStore, FieldData, FieldDataType, GeoJsonStore, OutputFeature,
    OutputLayer,
};
use featureline_common::utils::{get_formatted_elapsed_time, progress_percent};
use std::io::Error;
use std::time::Instant;

const CORRIDOR_FIELDS: [(&str, FieldDataType); 7] = [
    ("Corridor_ID", FieldDataType::Int),
    ("Link_Cnt", FieldDataType::Int),
    ("Min_Link_Angle", FieldDataType::Real),
    ("Max_Link_Angle", FieldDataType::Real),
    ("Mean_Link_Angle", FieldDataType::Real),
    ("Parallel_Present", FieldDataType::Bool),
    ("Azimuth", FieldDataType::Real),
];

/// This tool groups lines into corridors. Two lines are linked when they lie
/// within the connected range (`--range`) of each other; a link is parallel
/// when the relative angle between the two lines' bearings is no greater than
/// the parallel threshold (`--threshold`, in degrees). A corridor is a set of
/// lines joined by chains of parallel links, and every line belongs to exactly
/// one corridor. An isolated line forms a corridor of its own.
///
/// The output copies the input lines and adds `Corridor_ID`, the number of
/// links (`Link_Cnt`), the smallest, largest and mean angle of the
/// non-parallel links (`Min_Link_Angle`, `Max_Link_Angle`, `Mean_Link_Angle`;
/// null when there are none), whether any link is parallel
/// (`Parallel_Present`) and the line's bearing (`Azimuth`).
pub struct FeatureLineCorridorAssembly {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl FeatureLineCorridorAssembly {
    pub fn new() -> FeatureLineCorridorAssembly {
        // public constructor
        let name = "FeatureLineCorridorAssembly".to_string();
        let toolbox = "Line Analysis".to_string();
        let description = "Groups nearby, near-parallel lines into corridors.".to_string();

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
            name: "Connected Range".to_owned(),
            flags: vec!["--range".to_owned()],
            description: "Maximum distance between linked lines, in map units.".to_owned(),
            parameter_type: ParameterType::Float,
            default_value: Some("0.0".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Parallel Threshold".to_owned(),
            flags: vec!["--threshold".to_owned()],
            description: "Largest relative angle, in degrees, of a parallel link.".to_owned(),
            parameter_type: ParameterType::Float,
            default_value: Some("10.0".to_owned()),
            optional: true,
        });

        let usage = example_usage(
            &name,
            "-i=streets.geojson -o=corridors.geojson --range=15.0 --threshold=10.0",
        );

        FeatureLineCorridorAssembly {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl FeatureLineTool for FeatureLineCorridorAssembly {
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
        let mut connected_range = 0f64;
        let mut parallel_threshold = 10f64;

        // read the arguments
        for (flag_val, value) in parse_args(&args)? {
            if flag_val == "-i" || flag_val == "-input" {
                input_file = value;
            } else if flag_val == "-o" || flag_val == "-output" {
                output_file = value;
            } else if flag_val == "-range" {
                connected_range = parse_value(&flag_val, &value)?;
            } else if flag_val == "-threshold" {
                parallel_threshold = parse_value(&flag_val, &value)?;
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

        if verbose {
            println!("Assembling corridors...");
        }
        let assembly = assemble_corridors(&input.features, connected_range, parallel_threshold)?;

        let mut output = OutputLayer::default();
        for field in input.fields() {
            if !CORRIDOR_FIELDS.iter().any(|(name, _)| *name == field.name) {
                output.fields.push(field);
            }
        }
        for (name, field_type) in CORRIDOR_FIELDS.iter() {
            output.fields.push(AttributeField::new(name, *field_type));
        }

        let num_features = input.features.len();
        let mut old_progress = 1usize;
        for (i, (feature, record)) in input
            .features
            .iter()
            .zip(assembly.records.iter())
            .enumerate()
        {
            let mut attributes = feature.attributes.clone();
            attributes.insert("Corridor_ID".to_string(), FieldData::Int(record.corridor_id as i64));
            attributes.insert("Link_Cnt".to_string(), FieldData::Int(record.link_count as i64));
            attributes.insert("Min_Link_Angle".to_string(), record.min_link_angle.into());
            attributes.insert("Max_Link_Angle".to_string(), record.max_link_angle.into());
            attributes.insert("Mean_Link_Angle".to_string(), record.mean_link_angle.into());
            attributes.insert(
                "Parallel_Present".to_string(),
                FieldData::Bool(record.parallel_present),
            );
            attributes.insert("Azimuth".to_string(), record.bearing.into());
            output.features.push(OutputFeature {
                geometry: feature.geometry.clone(),
                attributes,
            });

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
            println!("Number of corridors: {}", assembly.num_corridors);
            let skipped = input.skipped_records + assembly.skipped_lines;
            if skipped > 0 {
                println!(
                    "Warning: {} input records had no usable line geometry.",
                    skipped
                );
            }
            let elapsed_time = get_formatted_elapsed_time(start);
            println!("{}", &format!("Elapsed Time: {}", elapsed_time));
        }

        Ok(())
    }
}
