use anyhow::{Context, Result, anyhow};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Mapping from NTA tract names to application slugs.
///
/// Exact-match on the tract name, many-to-one: several NTA sub-areas can fold
/// into one neighborhood. Tract names with no entry are dropped by the
/// pipeline, not defaulted. The table is passed into the pipeline explicitly
/// so tests can substitute a small one.
#[derive(Debug, Clone)]
pub struct SlugMapping {
    entries: HashMap<String, String>,
}

impl SlugMapping {
    /// The table shipped with the application, covering the supported
    /// neighborhood set across all five boroughs.
    pub fn builtin() -> Self {
        Self {
            entries: NTA_TO_SLUG
                .iter()
                .map(|&(name, slug)| (name.to_string(), slug.to_string()))
                .collect(),
        }
    }

    /// Load an override table from a JSON object file, `{"NTA Name": "slug", ...}`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open mapping file: {:?}", path))?;
        let entries: HashMap<String, String> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse mapping file: {:?}", path))?;
        if entries.is_empty() {
            return Err(anyhow!("Mapping file {:?} contains no entries", path));
        }
        Ok(Self::from_entries(entries))
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, tract_name: &str) -> Option<&str> {
        self.entries.get(tract_name).map(String::as_str)
    }

    /// Distinct slugs the table can produce. Used by the coverage check.
    pub fn slugs(&self) -> HashSet<&str> {
        self.entries.values().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Slug remaps consulted by the icon renderer before feature lookup, for the
/// few neighborhoods whose preferred icon differs from the slug the cleaned
/// dataset carries. Identity when no entry exists.
#[derive(Debug, Clone, Default)]
pub struct IconAliases {
    map: HashMap<String, String>,
}

impl IconAliases {
    pub fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn resolve<'a>(&'a self, slug: &'a str) -> &'a str {
        self.map.get(slug).map(String::as_str).unwrap_or(slug)
    }
}

// Some neighborhoods in the application are sub-areas of an NTA tract or
// carry a different name; those fold into one slug.
const NTA_TO_SLUG: &[(&str, &str)] = &[
    // Manhattan
    ("Battery Park City-Lower Manhattan", "battery-park-city"),
    ("Tribeca", "tribeca"),
    ("SoHo-TriBeCa-Civic Center-Little Italy", "soho"),
    ("Chinatown", "chinatown"),
    ("Lower East Side", "lower-east-side"),
    ("East Village", "east-village"),
    ("West Village", "west-village"),
    ("Chelsea-Clinton", "chelsea"),
    ("Gramercy", "gramercy"),
    ("Midtown-Midtown South", "midtown"),
    ("Murray Hill-Kips Bay", "murray-hill"),
    ("Turtle Bay-East Midtown", "turtle-bay"),
    ("Upper East Side-Carnegie Hill", "upper-east-side"),
    ("Yorkville", "upper-east-side"),
    ("Upper West Side", "upper-west-side"),
    ("Lincoln Square", "upper-west-side"),
    ("Clinton", "hells-kitchen"),
    ("Morningside Heights", "morningside-heights"),
    ("Hamilton Heights", "hamilton-heights"),
    ("Central Harlem North-Polo Grounds", "harlem"),
    ("Central Harlem South", "harlem"),
    ("East Harlem North", "east-harlem"),
    ("East Harlem South", "east-harlem"),
    ("Washington Heights North", "washington-heights"),
    ("Washington Heights South", "washington-heights"),
    ("Inwood", "inwood"),
    ("Marble Hill-Inwood", "marble-hill"),
    ("Manhattanville", "harlem"),
    ("Hudson Yards-Chelsea-Flatiron-Union Square", "flatiron"),
    ("Lenox Hill-Roosevelt Island", "roosevelt-island"),
    ("Stuyvesant Town-Cooper Village", "stuyvesant-town"),
    // Brooklyn
    ("Williamsburg", "williamsburg"),
    ("North Side-South Side", "williamsburg"),
    ("East Williamsburg", "williamsburg"),
    ("Greenpoint", "greenpoint"),
    ("Bushwick North", "bushwick"),
    ("Bushwick South", "bushwick"),
    ("Bedford", "bed-stuy"),
    ("Stuyvesant Heights", "bed-stuy"),
    ("Crown Heights North", "crown-heights"),
    ("Crown Heights South", "crown-heights"),
    ("Park Slope-Gowanus", "park-slope"),
    ("Prospect Heights", "prospect-heights"),
    ("Fort Greene", "fort-greene"),
    ("Brooklyn Heights-Cobble Hill", "brooklyn-heights"),
    ("DUMBO-Vinegar Hill-Downtown Brooklyn-Boerum Hill", "dumbo"),
    ("Carroll Gardens-Columbia Street-Red Hook", "carroll-gardens"),
    ("Sunset Park West", "sunset-park"),
    ("Sunset Park East", "sunset-park"),
    ("Bay Ridge", "bay-ridge"),
    ("Dyker Heights", "dyker-heights"),
    ("Bensonhurst West", "bensonhurst"),
    ("Bensonhurst East", "bensonhurst"),
    ("Coney Island-Brighton Beach", "coney-island"),
    ("Seagate-Coney Island", "coney-island"),
    ("Brighton Beach", "brighton-beach"),
    ("Sheepshead Bay-Gerritsen Beach-Manhattan Beach", "sheepshead-bay"),
    ("Homecrest", "sheepshead-bay"),
    ("Gravesend", "gravesend"),
    ("Ocean Parkway South", "gravesend"),
    ("Flatbush", "flatbush"),
    ("Madison", "flatbush"),
    ("Erasmus", "flatbush"),
    ("Rugby-Remsen Village", "flatbush"),
    ("East Flatbush-Farragut", "east-flatbush"),
    ("Flatlands", "flatlands"),
    ("Canarsie", "canarsie"),
    ("Starrett City", "canarsie"),
    ("East New York", "east-new-york"),
    ("East New York (Pennsylvania Ave)", "east-new-york"),
    ("Cypress Hills-City Line", "east-new-york"),
    ("Brownsville", "brownsville"),
    ("Ocean Hill", "brownsville"),
    ("Clinton Hill", "clinton-hill"),
    ("Borough Park", "borough-park"),
    ("Kensington-Ocean Parkway", "kensington"),
    ("Midwood", "midwood"),
    ("Bath Beach", "bath-beach"),
    ("Prospect Lefferts Gardens-Wingate", "prospect-lefferts-gardens"),
    ("Windsor Terrace", "windsor-terrace"),
    ("Georgetown-Marine Park-Bergen Beach-Mill Basin", "marine-park"),
    // Queens
    ("Long Island City-Hunters Point", "long-island-city"),
    ("Queensbridge-Ravenswood-Long Island City", "long-island-city"),
    ("Astoria", "astoria"),
    ("Old Astoria", "astoria"),
    ("Steinway", "astoria"),
    ("Sunnyside", "sunnyside"),
    ("Hunters Point-Sunnyside-West Maspeth", "sunnyside"),
    ("Woodside", "woodside"),
    ("Jackson Heights", "jackson-heights"),
    ("Elmhurst", "elmhurst"),
    ("East Elmhurst", "elmhurst"),
    ("Elmhurst-Maspeth", "elmhurst"),
    ("Corona", "corona"),
    ("North Corona", "corona"),
    ("Flushing", "flushing"),
    ("Murray Hill-Flushing", "flushing"),
    ("Queensboro Hill", "flushing"),
    ("East Flushing", "flushing"),
    ("Pomonok-Flushing Heights-Hillcrest", "flushing"),
    ("Forest Hills", "forest-hills"),
    ("Rego Park", "rego-park"),
    ("Kew Gardens", "kew-gardens"),
    ("Kew Gardens-Jamaica Hills", "kew-gardens"),
    ("Kew Gardens Hills", "kew-gardens"),
    ("Richmond Hill", "richmond-hill"),
    ("Jamaica", "jamaica"),
    ("Jamaica Estates-Holliswood", "jamaica"),
    ("South Jamaica", "jamaica"),
    ("Baisley Park", "jamaica"),
    ("Ridgewood", "ridgewood"),
    ("Middle Village", "middle-village"),
    ("Maspeth", "maspeth"),
    ("Glendale", "glendale"),
    ("Ozone Park", "ozone-park"),
    ("Woodhaven", "ozone-park"),
    ("Howard Beach", "howard-beach"),
    ("Lindenwood-Howard Beach", "howard-beach"),
    ("South Ozone Park", "south-ozone-park"),
    ("St. Albans", "st-albans"),
    ("Springfield Gardens North", "st-albans"),
    ("Hollis", "hollis"),
    ("Queens Village", "queens-village"),
    ("Laurelton", "queens-village"),
    ("Bellerose", "bellerose"),
    ("Glen Oaks-Floral Park-New Hyde Park", "bellerose"),
    ("Bayside-Bayside Hills", "bayside"),
    ("Ft. Totten-Bay Terrace-Clearview", "bayside"),
    ("Oakland Gardens", "bayside"),
    ("Whitestone", "whitestone"),
    ("College Point", "college-point"),
    ("Douglaston-Little Neck", "douglaston"),
    ("Douglas Manor-Douglaston-Little Neck", "little-neck"),
    ("Auburndale", "auburndale"),
    ("Fresh Meadows", "fresh-meadows"),
    ("Fresh Meadows-Utopia", "fresh-meadows"),
    ("Briarwood-Jamaica Hills", "briarwood"),
    ("Cambria Heights", "cambria-heights"),
    ("Rosedale", "rosedale"),
    ("Springfield Gardens South-Brookville", "rosedale"),
    ("Far Rockaway-Bayswater", "far-rockaway"),
    ("Rockaway Park-Rockaway Beach", "rockaway-beach"),
    ("Arverne-Edgemere", "arverne"),
    ("Hammels-Arverne-Edgemere", "arverne"),
    ("Breezy Point-Belle Harbor-Rockaway Park-Broad Channel", "breezy-point"),
    ("Murray Hill", "murray-hill"),
    // Bronx
    ("Mott Haven-Port Morris", "mott-haven"),
    ("Hunts Point", "hunts-point"),
    ("Longwood", "longwood"),
    ("Melrose South-Mott Haven North", "melrose"),
    ("Morrisania-Melrose", "morrisania"),
    ("Crotona Park East", "morrisania"),
    ("Highbridge", "highbridge"),
    ("Concourse-Concourse Village", "concourse"),
    ("East Concourse-Concourse Village", "concourse"),
    ("West Concourse", "concourse"),
    ("Fordham South", "fordham"),
    ("Bedford Park-Fordham North", "bedford-park"),
    ("Norwood", "norwood"),
    ("Kingsbridge-Riverdale", "kingsbridge"),
    ("Van Cortlandt Village", "kingsbridge"),
    ("Kingsbridge Heights", "kingsbridge"),
    ("Riverdale-North Riverdale-Fieldston", "riverdale"),
    ("North Riverdale-Fieldston-Riverdale", "fieldston"),
    ("Spuyten Duyvil-Kingsbridge", "spuyten-duyvil"),
    ("Throgs Neck-Clason Point", "throgs-neck"),
    ("Schuylerville-Throgs Neck-Edgewater Park", "throgs-neck"),
    ("Country Club-City Island", "country-club"),
    ("Pelham Bay-Country Club-City Island", "pelham-bay"),
    ("Allerton-Pelham Gardens", "pelham-bay"),
    ("Pelham Parkway", "pelham-bay"),
    ("Parkchester", "parkchester"),
    ("Van Nest-Morris Park-Westchester Square", "parkchester"),
    ("Soundview-Castle Hill-Clason Point-Harding Park", "soundview"),
    ("Westchester-Unionport", "soundview"),
    ("Soundview-Bruckner", "soundview"),
    ("Tremont", "tremont"),
    ("West Farms-Bronx River", "tremont"),
    ("Claremont-Bathgate", "tremont"),
    ("Mount Hope", "tremont"),
    ("East Tremont", "tremont"),
    ("Belmont", "belmont"),
    ("Morris Heights-University Heights", "morris-heights"),
    ("University Heights-Morris Heights", "university-heights"),
    ("Woodlawn-Wakefield", "woodlawn"),
    ("Williamsbridge-Olinville", "williamsbridge"),
    ("Bronxdale", "williamsbridge"),
    ("Eastchester-Edenwald-Baychester", "eastchester"),
    ("Co-op City", "co-op-city"),
    // Staten Island
    ("St. George-New Brighton", "st-george"),
    ("West New Brighton-New Brighton-St. George", "st-george"),
    ("New Brighton-Silver Lake", "new-brighton"),
    ("Tompkinsville-Stapleton-Clifton", "tompkinsville"),
    ("Stapleton-Rosebank", "stapleton"),
    ("Grymes Hill-Clifton-Fox Hills", "clifton"),
    ("Port Richmond", "port-richmond"),
    ("West Brighton", "west-brighton"),
    ("Mariners Harbor-Port Ivory-Arlington", "mariners-harbor"),
    ("Mariner's Harbor-Arlington-Port Ivory-Graniteville", "mariners-harbor"),
    ("Graniteville-Concord", "graniteville"),
    ("Westerleigh", "willowbrook"),
    ("Willowbrook", "willowbrook"),
    ("New Springville-Bloomfield-Travis", "new-springville"),
    ("Todt Hill-Emerson Hill-Heartland Village-Lighthouse Hill", "todt-hill"),
    ("Dongan Hills-South Beach-Midland Beach", "dongan-hills"),
    ("Old Town-Dongan Hills-South Beach", "dongan-hills"),
    ("Grasmere-Arrochar-Ft. Wadsworth", "south-beach"),
    ("New Dorp-Midland Beach", "midland-beach"),
    ("New Dorp-Oakwood", "new-dorp"),
    ("Oakwood-Oakwood Beach", "oakwood"),
    ("Great Kills", "great-kills"),
    ("Eltingville-Annadale-Prince's Bay", "eltingville"),
    ("Annadale-Huguenot-Prince's Bay-Eltingville", "annadale"),
    ("Charleston-Richmond Valley-Tottenville", "charleston"),
    ("Tottenville-Charleston-Richmond Valley-Pleasant Plains", "tottenville"),
    ("Rossville-Woodrow", "rossville"),
    ("Arden Heights", "huguenot"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_resolves_known_tracts() {
        let mapping = SlugMapping::builtin();
        assert_eq!(mapping.get("Williamsburg"), Some("williamsburg"));
        assert_eq!(mapping.get("Chelsea-Clinton"), Some("chelsea"));
        assert_eq!(mapping.get("Random Unmapped Tract"), None);
    }

    #[test]
    fn builtin_table_is_many_to_one() {
        let mapping = SlugMapping::builtin();
        assert_eq!(mapping.get("Bushwick North"), Some("bushwick"));
        assert_eq!(mapping.get("Bushwick South"), Some("bushwick"));
        // Codomain is smaller than the entry count
        assert!(mapping.slugs().len() < mapping.len());
    }

    #[test]
    fn builtin_table_has_no_duplicate_tract_names() {
        // The HashMap would silently keep one entry per name; make sure the
        // source table does not rely on that.
        assert_eq!(SlugMapping::builtin().len(), NTA_TO_SLUG.len());
    }

    #[test]
    fn aliases_fall_through_to_identity() {
        let aliases = IconAliases::default();
        assert_eq!(aliases.resolve("bushwick"), "bushwick");

        let aliases = IconAliases::new(
            [("prospect-lefferts-gardens".to_string(), "flatbush".to_string())].into(),
        );
        assert_eq!(aliases.resolve("prospect-lefferts-gardens"), "flatbush");
        assert_eq!(aliases.resolve("bushwick"), "bushwick");
    }
}
