//! X-axis labels derived from histogram names.

/// Keyword → x-axis label, searched in order; the first hit wins.
const LABELS: [(&str, &str); 5] = [
    ("energy", "Energy [GeV]"),
    ("pt", "p$_T$ [GeV]"),
    ("mass", "Mass [GeV]"),
    ("eta", r"$\eta$"),
    ("phi", r"$\phi$"),
];

/// Label used when no keyword matches.
pub const DEFAULT_LABEL: &str = "Value";

/// X-axis label (mathtext) for a histogram name.
pub fn resolve_xlabel(histogram_name: &str) -> &'static str {
    let name = histogram_name.to_lowercase();
    LABELS
        .iter()
        .find(|(keyword, _)| name.contains(*keyword))
        .map_or(DEFAULT_LABEL, |&(_, label)| label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_map_to_labels() {
        assert_eq!(resolve_xlabel("jet_PT_leading"), "p$_T$ [GeV]");
        assert_eq!(resolve_xlabel("m_mass_reco"), "Mass [GeV]");
        assert_eq!(resolve_xlabel("jet_eta_central"), r"$\eta$");
        assert_eq!(resolve_xlabel("lep_phi"), r"$\phi$");
    }

    #[test]
    fn energy_takes_precedence_over_pt() {
        assert_eq!(resolve_xlabel("missing_energy_pt"), "Energy [GeV]");
    }

    #[test]
    fn unknown_names_get_default() {
        assert_eq!(resolve_xlabel("n_jets"), "Value");
        assert_eq!(resolve_xlabel(""), "Value");
    }
}
