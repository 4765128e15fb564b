use clap::ValueEnum;
use phantom_config::BundleMode;

/// Bundle mode as spelled on the command line
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum BundleModeArg {
    /// Keep only Node built-ins external
    #[value(name = "externalize-builtins", alias = "builtins")]
    ExternalizeBuiltins,

    /// Keep Node built-ins and automation drivers external
    #[value(name = "externalize-drivers", alias = "drivers")]
    ExternalizeDrivers,

    /// Bundle everything except Node built-ins
    #[value(name = "bundle-everything", alias = "all")]
    BundleEverything,
}

impl From<BundleModeArg> for BundleMode {
    fn from(arg: BundleModeArg) -> Self {
        match arg {
            BundleModeArg::ExternalizeBuiltins => BundleMode::ExternalizeBuiltins,
            BundleModeArg::ExternalizeDrivers => BundleMode::ExternalizeDrivers,
            BundleModeArg::BundleEverything => BundleMode::BundleEverything,
        }
    }
}
