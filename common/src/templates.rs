//! レシピテンプレート
//!
//! 画像アップロード時の「生成結果」として使う固定レシピ。
//! 推論は行わず、カタログからランダムに1件選ぶ。

use crate::error::{Error, Result};
use crate::types::{Cuisine, Difficulty, Recipe};
use rand::Rng;

struct TemplateSpec {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    image: &'static str,
    ingredients: &'static [&'static str],
    instructions: &'static [&'static str],
    cuisine: Cuisine,
    difficulty: Difficulty,
    prep_time: &'static str,
    cook_time: &'static str,
    preparation_time: &'static str,
    servings: u32,
    tags: &'static [&'static str],
}

const SOUTHEAST_ASIAN: &[TemplateSpec] = &[
    TemplateSpec {
        id: "template-nasi-lemak",
        title: "Nasi Lemak",
        description: "Coconut rice with pandan, crispy anchovies, peanuts, egg and sambal",
        image: "/images/recipes/nasi-lemak.jpg",
        ingredients: &[
            "Jasmine rice",
            "Coconut milk",
            "Pandan leaves",
            "Salt",
            "Dried anchovies",
            "Roasted peanuts",
            "Boiled eggs",
            "Sambal",
        ],
        instructions: &[
            "Rinse the rice until the water runs clear",
            "Cook the rice with coconut milk, salt and knotted pandan leaves",
            "Fry the anchovies and peanuts until crisp",
            "Cook the sambal down until the oil separates",
            "Plate the rice with the sambal, anchovies, peanuts and halved eggs",
        ],
        cuisine: Cuisine::Malaysian,
        difficulty: Difficulty::Medium,
        prep_time: "20 mins",
        cook_time: "30 mins",
        preparation_time: "50 mins",
        servings: 4,
        tags: &["coconut", "rice", "traditional", "breakfast"],
    },
    TemplateSpec {
        id: "template-tom-yum",
        title: "Tom Yum Goong",
        description: "Hot and sour prawn soup with lemongrass, galangal and lime leaves",
        image: "/images/recipes/tom-yum.jpg",
        ingredients: &[
            "Large prawns",
            "Lemongrass",
            "Kaffir lime leaves",
            "Thai chilies",
            "Galangal",
            "Lime juice",
            "Fish sauce",
            "Mushrooms",
        ],
        instructions: &[
            "Boil water with bruised lemongrass and sliced galangal",
            "Add the prawns and mushrooms",
            "Season with fish sauce and lime juice off the heat",
            "Finish with chilies and torn lime leaves",
        ],
        cuisine: Cuisine::Thai,
        difficulty: Difficulty::Easy,
        prep_time: "15 mins",
        cook_time: "15 mins",
        preparation_time: "30 mins",
        servings: 2,
        tags: &["spicy", "sour", "soup", "seafood"],
    },
    TemplateSpec {
        id: "template-pad-thai",
        title: "Pad Thai",
        description: "Stir-fried rice noodles balanced between sweet, sour and savory",
        image: "/images/recipes/pad-thai.jpg",
        ingredients: &[
            "Rice noodles",
            "Prawns or chicken",
            "Bean sprouts",
            "Eggs",
            "Firm tofu",
            "Tamarind paste",
            "Palm sugar",
            "Fish sauce",
            "Peanuts",
            "Lime wedges",
        ],
        instructions: &[
            "Soak the noodles until pliable",
            "Mix tamarind, palm sugar and fish sauce into a sauce",
            "Stir-fry the protein and tofu",
            "Add noodles and sauce, push aside and scramble the eggs",
            "Toss with bean sprouts and serve with peanuts and lime",
        ],
        cuisine: Cuisine::Thai,
        difficulty: Difficulty::Medium,
        prep_time: "25 mins",
        cook_time: "15 mins",
        preparation_time: "40 mins",
        servings: 3,
        tags: &["noodles", "stir-fry", "classic"],
    },
    TemplateSpec {
        id: "template-beef-rendang",
        title: "Beef Rendang",
        description: "Beef slow-cooked in coconut milk and spice paste until dark and dry",
        image: "/images/recipes/beef-rendang.jpg",
        ingredients: &[
            "Beef chuck",
            "Coconut milk",
            "Lemongrass",
            "Galangal",
            "Turmeric leaves",
            "Kaffir lime leaves",
            "Tamarind water",
            "Palm sugar",
            "Rendang spice paste",
        ],
        instructions: &[
            "Cut the beef into large chunks",
            "Fry the spice paste until fragrant",
            "Add beef, coconut milk and aromatics and bring to a simmer",
            "Cook uncovered, stirring often, until the sauce reduces and the oil separates",
            "Keep frying until the beef is dark and caramelized",
        ],
        cuisine: Cuisine::Indonesian,
        difficulty: Difficulty::Hard,
        prep_time: "30 mins",
        cook_time: "3 hours",
        preparation_time: "3.5 hours",
        servings: 6,
        tags: &["beef", "slow-cooked", "spicy"],
    },
    TemplateSpec {
        id: "template-pho-bo",
        title: "Pho Bo",
        description: "Clear beef broth with star anise and cinnamon over rice noodles",
        image: "/images/recipes/pho-bo.jpg",
        ingredients: &[
            "Beef bones",
            "Rice noodles",
            "Thinly sliced beef",
            "Star anise",
            "Cinnamon stick",
            "Onions",
            "Ginger",
            "Fish sauce",
            "Fresh herbs",
            "Lime wedges",
        ],
        instructions: &[
            "Char the onions and ginger",
            "Simmer the bones with the charred aromatics and spices for several hours",
            "Cook the noodles and divide between bowls",
            "Top with raw beef slices and ladle over the boiling broth",
            "Serve with herbs and lime",
        ],
        cuisine: Cuisine::Vietnamese,
        difficulty: Difficulty::Medium,
        prep_time: "45 mins",
        cook_time: "4 hours",
        preparation_time: "5 hours",
        servings: 4,
        tags: &["soup", "beef", "herbs"],
    },
    TemplateSpec {
        id: "template-char-kway-teow",
        title: "Char Kway Teow",
        description: "Flat rice noodles stir-fried over high heat with prawns and sausage",
        image: "/images/recipes/char-kway-teow.jpg",
        ingredients: &[
            "Fresh flat rice noodles",
            "Prawns",
            "Chinese sausage",
            "Bean sprouts",
            "Eggs",
            "Chives",
            "Dark soy sauce",
            "Light soy sauce",
            "Chili paste",
        ],
        instructions: &[
            "Heat the wok until smoking",
            "Fry the prawns and sausage",
            "Add noodles and sauces and toss quickly",
            "Add egg, bean sprouts and chives",
            "Serve immediately",
        ],
        cuisine: Cuisine::Malaysian,
        difficulty: Difficulty::Medium,
        prep_time: "20 mins",
        cook_time: "10 mins",
        preparation_time: "30 mins",
        servings: 2,
        tags: &["noodles", "wok", "street-food"],
    },
];

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl TemplateSpec {
    fn to_recipe(&self) -> Recipe {
        Recipe {
            id: self.id.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            image: self.image.to_string(),
            image_path: self.image.to_string(),
            ingredients: to_strings(self.ingredients),
            instructions: to_strings(self.instructions),
            preparation_time: Some(self.preparation_time.to_string()),
            prep_time: Some(self.prep_time.to_string()),
            cook_time: Some(self.cook_time.to_string()),
            servings: Some(self.servings),
            difficulty: Some(self.difficulty),
            cuisine: Some(self.cuisine),
            tags: to_strings(self.tags),
            created_at: String::new(),
        }
    }
}

/// テンプレートカタログ（空でないことを保証）
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<Recipe>,
}

impl TemplateCatalog {
    pub fn new(templates: Vec<Recipe>) -> Result<Self> {
        if templates.is_empty() {
            return Err(Error::Config("template catalog must not be empty".into()));
        }
        Ok(Self { templates })
    }

    /// 東南アジア料理の組み込みカタログ
    pub fn southeast_asian() -> Self {
        Self {
            templates: SOUTHEAST_ASIAN.iter().map(TemplateSpec::to_recipe).collect(),
        }
    }

    /// 一様ランダムに1件選ぶ
    pub fn pick<R: Rng>(&self, rng: &mut R) -> &Recipe {
        let index = rng.random_range(0..self.templates.len());
        &self.templates[index]
    }

    pub fn titles(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.title.as_str()).collect()
    }

    pub fn templates(&self) -> &[Recipe] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::southeast_asian()
    }
}
