/*
This tool is part of the FeatureLine Tools geospatial analysis library.
Authors: FeatureLine Tools contributors
Created: 23/09/2026
Last Modified: 06/10/2026
License: MIT
*/

use crate::tools::*;
use featureline_common::algorithms::relative_angles;
use featureline_common::configs::Configs;
use featureline_common::features::{
    AttributeField, FeatureStore, FieldData, FieldDataType, GeoJsonStore, OutputFeature,
    OutputLayer,
};
use featureline_common::utils::{get_formatted_elapsed_time, progress_percent};
use std::io::Error;
use std::time::Instant;

/// This tool finds, for every target line (`--targets`), the smallest relative
/// angle to any reference line (`--references`) within the search radius
/// (`--radius`). Lines are treated as undirected, so a reference running the
/// opposite way to its target still has a relative angle of zero.
///
/// The output copies the target lines and adds the number of references in
/// range (`Ref_Count`), the smallest angle (`Rel_Angle`, null without
/// references), the id of the reference forming it (`Ref_ID`) and the target's
/// bearing (`Azimuth`). When an angle threshold (`--threshold`) is given,
/// `Is_Parallel` records whether the smallest angle is within it.
pub struct FeatureLineRelativeAngle {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl FeatureLineRelativeAngle {
    pub fn new() -> FeatureLineRelativeAngle {
        // public constructor
        let name = "FeatureLineRelativeAngle".to_string();
        let toolbox = "Line Analysis".to_string();
        let description =
            "Finds the smallest relative angle between target lines and nearby reference lines."
                .to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Target Vector Lines File".to_owned(),
            flags: vec!["--targets".to_owned()],
            description: "Input vector line file of target lines.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Vector(
                VectorGeometryType::Line,
            )),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Reference Vector Lines File".to_owned(),
            flags: vec!["--references".to_owned()],
            description: "Input vector line file of reference lines.".to_owned(),
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
            name: "Search Radius".to_owned(),
            flags: vec!["--radius".to_owned()],
            description: "Search radius around each target line, in map units.".to_owned(),
            parameter_type: ParameterType::Float,
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Angle Threshold".to_owned(),
            flags: vec!["--threshold".to_owned()],
            description: "Optional largest angle, in degrees, at which lines count as parallel."
                .to_owned(),
            parameter_type: ParameterType::Float,
            default_value: None,
            optional: true,
        });

        let usage = example_usage(
            &name,
            "--targets=trails.geojson --references=roads.geojson -o=angles.geojson --radius=50.0 --threshold=15.0",
        );

        FeatureLineRelativeAngle {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl FeatureLineTool for FeatureLineRelativeAngle {
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
        let mut targets_file = String::new();
        let mut references_file = String::new();
        let mut output_file = String::new();
        let mut search_radius = String::new();
        let mut angle_threshold: Option<f64> = None;

        // read the arguments
        for (flag_val, value) in parse_args(&args)? {
            if flag_val == "-targets" {
                targets_file = value;
            } else if flag_val == "-references" {
                references_file = value;
            } else if flag_val == "-o" || flag_val == "-output" {
                output_file = value;
            } else if flag_val == "-radius" {
                search_radius = value;
            } else if flag_val == "-threshold" && !value.trim().is_empty() {
                angle_threshold = Some(parse_value(&flag_val, &value)?);
            }
        }
        required(&targets_file, "--targets")?;
        required(&references_file, "--references")?;
        required(&output_file, "--output")?;
        required(&search_radius, "--radius")?;
        let search_radius: f64 = parse_value("--radius", &search_radius)?;

        let verbose = configs.verbose_mode;
        if verbose {
            welcome(&self.get_tool_name());
        }

        let start = Instant::now();
        let targets_file = resolve_path(&targets_file, &configs.working_directory);
        let references_file = resolve_path(&references_file, &configs.working_directory);
        let output_file = resolve_path(&output_file, &configs.working_directory);

        let store = GeoJsonStore::new();
        if verbose {
            println!("Reading data...");
        }
        let targets = store.read_lines(&targets_file)?;
        let references = store.read_lines(&references_file)?;

        if verbose {
            println!("Measuring relative angles...");
        }
        let records = relative_angles(
            &targets.features,
            &references.features,
            search_radius,
            angle_threshold,
        )?;

        let new_fields = ["Ref_Count", "Rel_Angle", "Ref_ID", "Is_Parallel", "Azimuth"];
        let mut output = OutputLayer::default();
        for field in targets.fields() {
            if !new_fields.contains(&field.name.as_str()) {
                output.fields.push(field);
            }
        }
        output.fields.push(AttributeField::new("Ref_Count", FieldDataType::Int));
        output.fields.push(AttributeField::new("Rel_Angle", FieldDataType::Real));
        output.fields.push(AttributeField::new("Ref_ID", FieldDataType::Int));
        if angle_threshold.is_some() {
            output.fields.push(AttributeField::new("Is_Parallel", FieldDataType::Bool));
        }
        output.fields.push(AttributeField::new("Azimuth", FieldDataType::Real));

        let num_features = targets.features.len();
        let mut old_progress = 1usize;
        let mut no_reference = 0usize;
        for (i, (feature, record)) in targets.features.iter().zip(records.iter()).enumerate() {
            let mut attributes = feature.attributes.clone();
            attributes.insert(
                "Ref_Count".to_string(),
                FieldData::Int(record.reference_count as i64),
            );
            attributes.insert("Rel_Angle".to_string(), record.smallest_angle.into());
            attributes.insert(
                "Ref_ID".to_string(),
                record.nearest_reference.map_or(FieldData::Null, FieldData::Int),
            );
            if let Some(is_parallel) = record.is_parallel {
                attributes.insert("Is_Parallel".to_string(), FieldData::Bool(is_parallel));
            }
            attributes.insert("Azimuth".to_string(), record.bearing.into());
            if record.reference_count == 0 {
                no_reference += 1;
            }
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
            if no_reference > 0 {
                println!(
                    "Warning: {} target lines had no reference line within the search radius.",
                    no_reference
                );
            }
            let skipped = targets.skipped_records + references.skipped_records;
            if skipped > 0 {
                println!("Warning: {} input records were not valid lines and were skipped.", skipped);
            }
            let elapsed_time = get_formatted_elapsed_time(start);
            println!("{}", &format!("Elapsed Time: {}", elapsed_time));
        }

        Ok(())
    }
}
