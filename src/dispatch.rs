use serde::Serialize;

use crate::envelope::ClassificationResponse;

/// Bin colour a classified item belongs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Red,
    Grey,
    Blue,
    White,
    Unknown,
}

impl Category {
    pub const KNOWN: [Category; 4] = [Category::Red, Category::Grey, Category::Blue, Category::White];

    /// Labels outside the four bins, including "Unknown Category" from the
    /// backend, map to `Unknown`.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some("Red") => Category::Red,
            Some("Grey") => Category::Grey,
            Some("Blue") => Category::Blue,
            Some("White") => Category::White,
            _ => Category::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Red => "Red",
            Category::Grey => "Grey",
            Category::Blue => "Blue",
            Category::White => "White",
            Category::Unknown => "Unknown",
        }
    }

    /// White text on a white surface is invisible, so White inherits.
    pub fn highlight(self) -> Highlight {
        match self {
            Category::Red => Highlight::Colour("red"),
            Category::Grey => Highlight::Colour("grey"),
            Category::Blue => Highlight::Colour("blue"),
            Category::White | Category::Unknown => Highlight::Inherit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Highlight {
    Colour(&'static str),
    Inherit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prediction {
    pub raw_label: String,
    pub category: Category,
}

impl From<&ClassificationResponse> for Prediction {
    fn from(r: &ClassificationResponse) -> Self {
        Prediction {
            raw_label: r.prediction.clone(),
            category: Category::from_label(r.mapped_biomedical_category.as_deref()),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct CategoryContentBundle {
    pub purpose: &'static str,
    pub handling: &'static [&'static str],
    pub disposal: &'static str,
    pub recyclability: &'static str,
    pub prohibitions: &'static [&'static str],
    pub environmental_impact: &'static str,
    pub compliance_note: Option<&'static str>,
}

impl CategoryContentBundle {
    /// True for the "no guidance available" placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.purpose.is_empty()
    }
}

pub static PLACEHOLDER: CategoryContentBundle = CategoryContentBundle {
    purpose: "",
    handling: &[],
    disposal: "",
    recyclability: "",
    prohibitions: &[],
    environmental_impact: "",
    compliance_note: None,
};

static RED: CategoryContentBundle = CategoryContentBundle {
    purpose: "Collect infectious materials (blood-soaked items, bodily fluids, contaminated PPE).",
    handling: &[
        "Segregate at point of generation using color-coded bins.",
        "Use puncture-resistant, leak-proof containers labeled with biohazard symbols.",
        "Sharps (needles, scalpels) must go into separate puncture-proof containers first.",
    ],
    disposal: "Autoclaved (steam-sterilized) or incinerated to neutralize pathogens.",
    recyclability: "Not recycled. Single-use red bags are incinerated or landfilled after treatment.",
    prohibitions: &[
        "Mix with regular trash, radioactive waste, or loose sharps.",
        "Overfill containers or dispose of animal/human body parts in red bags.",
    ],
    environmental_impact: "Proper segregation reduces contamination risks and landfill burden. \
        Incineration releases CO₂ but ensures pathogen destruction.",
    compliance_note: None,
};

static GREY: CategoryContentBundle = CategoryContentBundle {
    purpose: "Bulk chemotherapy waste (greater than 3% residual drugs), hazardous pharmaceuticals \
        (e.g., nicotine), and contaminated PPE.",
    handling: &[
        "Segregate from trace chemo waste (yellow bins) to avoid penalties.",
        "Use DOT-approved containers labeled for hazardous waste.",
    ],
    disposal: "High-temperature incineration or encapsulation.",
    recyclability: "Not recycled. Containers are disposable and incinerated.",
    prohibitions: &["Never mix with trace chemo waste (yellow bins) or general trash."],
    environmental_impact: "Incineration releases toxins and CO₂ but prevents groundwater \
        contamination. Overclassification increases costs and emissions.",
    compliance_note: None,
};

static BLUE: CategoryContentBundle = CategoryContentBundle {
    purpose: "Non-hazardous medications (expired pills, empty vials) and some hazardous drugs \
        (e.g., antibiotics).",
    handling: &[
        "Segregate from controlled substances (e.g., narcotics).",
        "Use containers labeled \"non-hazardous\".",
    ],
    disposal: "Incinerated or autoclaved.",
    recyclability: "Glassware in blue bins may be recycled; pharmaceuticals are not.",
    prohibitions: &["Avoid placing hazardous P/U-listed drugs (e.g., warfarin) or loose sharps."],
    environmental_impact: "Prevents drug leaching into water systems. Improper disposal risks \
        antibiotic resistance and ecosystem harm.",
    compliance_note: Some(
        "Misclassifying waste increases disposal costs by 3-10x and environmental harm. \
         Always follow EPA, OSHA, and state guidelines.",
    ),
};

static WHITE: CategoryContentBundle = CategoryContentBundle {
    purpose: "Dedicated to needles, syringes, lancets, and broken glass to prevent injuries.",
    handling: &[
        "Use puncture-proof, leak-resistant containers with tight-fitting lids.",
        "Reusable containers reduce plastic waste.",
    ],
    disposal: "Autoclaved or incinerated when ¾ full.",
    recyclability: "Yes: Some programs clean and reuse containers. Single-use containers are incinerated.",
    prohibitions: &["Do not mix with other waste streams (e.g., chemotherapy sharps)."],
    environmental_impact: "Reusable programs reduce plastic waste by 90% and lower CO₂ emissions.",
    compliance_note: None,
};

pub fn bundle_for(category: Category) -> &'static CategoryContentBundle {
    match category {
        Category::Red => &RED,
        Category::Grey => &GREY,
        Category::Blue => &BLUE,
        Category::White => &WHITE,
        Category::Unknown => &PLACEHOLDER,
    }
}

/// Guidance for a prediction. Never fails; unknown categories get the placeholder.
pub fn resolve(prediction: &Prediction) -> &'static CategoryContentBundle {
    bundle_for(prediction.category)
}
