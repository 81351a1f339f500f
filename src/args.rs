use clap::Parser;

/// Places the activities of a community on a map, from spreadsheets of individuals and activities.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file describing the inputs, the geocoder and the
    /// policy settings. Paths inside the file are relative to the file itself. See the documentation
    /// of the activity_map::manual module for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The individuals file (.csv or .xlsx). Overrides the configuration file.
    #[clap(short, long, value_parser)]
    pub individuals: Option<String>,

    /// (file path) The activities file (.csv or .xlsx). Overrides the configuration file.
    #[clap(short, long, value_parser)]
    pub activities: Option<String>,

    /// (file path) A CSV file with the columns query,lat,lng used as an offline geocoder.
    /// Setting this option overrides the geocoder of the configuration file.
    #[clap(short, long, value_parser)]
    pub geocoder_table: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the map summary will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing a map summary in JSON format. If provided, actmap will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (default: first worksheet) When using Excel files, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
