//! Template days - the 14-day keto rotation, Spanish and English

use crate::plan::{DayMeals, Language, Macros, MealSlot, PlanDay};

/// Text in both supported languages
#[derive(Debug, Clone, Copy)]
pub struct Localized {
    pub es: &'static str,
    pub en: &'static str,
}

impl Localized {
    pub fn get(&self, lang: Language) -> &'static str {
        match lang {
            Language::Es => self.es,
            Language::En => self.en,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TemplateMeal {
    pub name: Localized,
    pub qty: Localized,
}

#[derive(Debug, Clone, Copy)]
pub struct TemplateDay {
    /// 0 means "not set", the builder substitutes its default
    pub kcal: i32,
    pub macros: Macros,
    /// desayuno, snackAM, almuerzo, snackPM, cena
    pub meals: [TemplateMeal; 5],
}

const fn l(es: &'static str, en: &'static str) -> Localized {
    Localized { es, en }
}

const fn meal(name: Localized, qty: Localized) -> TemplateMeal {
    TemplateMeal { name, qty }
}

const fn macros(carbs: u8, protein: u8, fat: u8) -> Macros {
    Macros { carbs, protein, fat }
}

#[rustfmt::skip]
pub const TEMPLATE_DAYS: &[TemplateDay] = &[
    // Semana 1
    TemplateDay {
        kcal: 1600,
        macros: macros(7, 25, 68),
        meals: [
            meal(l("Huevos revueltos con aguacate", "Scrambled eggs with avocado"),
                 l("3 huevos, 1/2 aguacate, 10 g mantequilla", "3 eggs, 1/2 avocado, 10 g butter")),
            meal(l("Almendras", "Almonds"), l("25 g almendras", "25 g almonds")),
            meal(l("Pollo al horno con brócoli", "Baked chicken with broccoli"),
                 l("180 g muslo de pollo, 150 g brócoli, 1 cda aceite de oliva", "180 g chicken thigh, 150 g broccoli, 1 tbsp olive oil")),
            meal(l("Queso curado", "Aged cheese"), l("30 g queso curado", "30 g aged cheese")),
            meal(l("Salmón con espárragos", "Salmon with asparagus"),
                 l("150 g salmón, 120 g espárragos, 10 g mantequilla", "150 g salmon, 120 g asparagus, 10 g butter")),
        ],
    },
    TemplateDay {
        kcal: 1550,
        macros: macros(8, 24, 68),
        meals: [
            meal(l("Tortilla de espinacas y queso", "Spinach and cheese omelette"),
                 l("3 huevos, 50 g espinacas, 30 g queso", "3 eggs, 50 g spinach, 30 g cheese")),
            meal(l("Nueces", "Walnuts"), l("20 g nueces", "20 g walnuts")),
            meal(l("Ensalada César keto", "Keto Caesar salad"),
                 l("150 g pollo, lechuga romana, 20 g parmesano, salsa César casera", "150 g chicken, romaine, 20 g parmesan, homemade Caesar dressing")),
            meal(l("Apio con crema de cacahuete", "Celery with peanut butter"),
                 l("2 ramas de apio, 15 g crema de cacahuete", "2 celery sticks, 15 g peanut butter")),
            meal(l("Hamburguesa sin pan", "Bunless burger"),
                 l("150 g ternera picada, 1 loncha de queso, ensalada verde", "150 g ground beef, 1 cheese slice, green salad")),
        ],
    },
    TemplateDay {
        kcal: 1650,
        macros: macros(6, 26, 68),
        meals: [
            meal(l("Yogur griego con nueces", "Greek yogurt with walnuts"),
                 l("150 g yogur griego entero, 15 g nueces, canela", "150 g full-fat Greek yogurt, 15 g walnuts, cinnamon")),
            meal(l("Huevo duro", "Hard-boiled egg"), l("1 huevo", "1 egg")),
            meal(l("Merluza en salsa verde", "Hake in green sauce"),
                 l("180 g merluza, perejil, ajo, 1 cda aceite de oliva", "180 g hake, parsley, garlic, 1 tbsp olive oil")),
            meal(l("Aceitunas", "Olives"), l("10 aceitunas", "10 olives")),
            meal(l("Solomillo de cerdo con champiñones", "Pork tenderloin with mushrooms"),
                 l("160 g solomillo, 100 g champiñones, nata para cocinar", "160 g tenderloin, 100 g mushrooms, cooking cream")),
        ],
    },
    TemplateDay {
        kcal: 1600,
        macros: macros(7, 25, 68),
        meals: [
            meal(l("Café bulletproof y huevos", "Bulletproof coffee and eggs"),
                 l("café, 10 g mantequilla, 2 huevos cocidos", "coffee, 10 g butter, 2 boiled eggs")),
            meal(l("Pepino con guacamole", "Cucumber with guacamole"),
                 l("1/2 pepino, 50 g guacamole", "1/2 cucumber, 50 g guacamole")),
            meal(l("Ternera salteada con pimientos", "Beef stir-fry with peppers"),
                 l("170 g ternera, 100 g pimiento, salsa de soja", "170 g beef, 100 g peppers, soy sauce")),
            meal(l("Jamón serrano", "Serrano ham"), l("40 g jamón serrano", "40 g serrano ham")),
            meal(l("Crema de calabacín con queso", "Zucchini soup with cheese"),
                 l("250 g calabacín, 30 g queso crema, 1 huevo", "250 g zucchini, 30 g cream cheese, 1 egg")),
        ],
    },
    TemplateDay {
        kcal: 1580,
        macros: macros(7, 27, 66),
        meals: [
            meal(l("Pancakes de queso crema", "Cream cheese pancakes"),
                 l("2 huevos, 50 g queso crema, canela", "2 eggs, 50 g cream cheese, cinnamon")),
            meal(l("Nueces de macadamia", "Macadamia nuts"), l("20 g macadamia", "20 g macadamia nuts")),
            meal(l("Atún a la plancha con ensalada", "Grilled tuna with salad"),
                 l("170 g atún, lechuga, tomate cherry, 1 cda aceite", "170 g tuna, lettuce, cherry tomatoes, 1 tbsp oil")),
            meal(l("Queso fresco", "Fresh cheese"), l("50 g queso fresco", "50 g fresh cheese")),
            meal(l("Pollo al curry con coliflor", "Chicken curry with cauliflower"),
                 l("160 g pollo, 150 g coliflor, leche de coco", "160 g chicken, 150 g cauliflower, coconut milk")),
        ],
    },
    TemplateDay {
        kcal: 1620,
        macros: macros(6, 25, 69),
        meals: [
            meal(l("Huevos con bacon", "Bacon and eggs"),
                 l("2 huevos, 40 g bacon", "2 eggs, 40 g bacon")),
            meal(l("Fresas con nata", "Strawberries and cream"),
                 l("60 g fresas, 30 ml nata montada sin azúcar", "60 g strawberries, 30 ml unsweetened whipped cream")),
            meal(l("Lubina al horno con calabacín", "Baked sea bass with zucchini"),
                 l("200 g lubina, 150 g calabacín, limón", "200 g sea bass, 150 g zucchini, lemon")),
            meal(l("Pipas de calabaza", "Pumpkin seeds"), l("20 g pipas de calabaza", "20 g pumpkin seeds")),
            meal(l("Albóndigas en salsa de tomate", "Meatballs in tomato sauce"),
                 l("150 g carne picada, 80 g tomate triturado, queso rallado", "150 g ground meat, 80 g crushed tomato, grated cheese")),
        ],
    },
    TemplateDay {
        kcal: 1700,
        macros: macros(7, 24, 69),
        meals: [
            meal(l("Chía con leche de coco", "Chia with coconut milk"),
                 l("25 g chía, 150 ml leche de coco, frambuesas", "25 g chia, 150 ml coconut milk, raspberries")),
            meal(l("Huevo duro con mayonesa", "Egg with mayonnaise"),
                 l("1 huevo, 10 g mayonesa", "1 egg, 10 g mayonnaise")),
            meal(l("Costillas de cerdo con ensalada", "Pork ribs with salad"),
                 l("200 g costillas, ensalada verde, 1 cda aceite", "200 g ribs, green salad, 1 tbsp oil")),
            meal(l("Chocolate negro 85%", "85% dark chocolate"), l("15 g chocolate", "15 g chocolate")),
            meal(l("Revuelto de setas y gambas", "Mushroom and prawn scramble"),
                 l("2 huevos, 100 g setas, 80 g gambas", "2 eggs, 100 g mushrooms, 80 g prawns")),
        ],
    },
    // Semana 2
    TemplateDay {
        kcal: 1600,
        macros: macros(7, 25, 68),
        meals: [
            meal(l("Tostada keto con aguacate", "Keto toast with avocado"),
                 l("1 pan nube, 1/2 aguacate, 1 huevo", "1 cloud bread, 1/2 avocado, 1 egg")),
            meal(l("Avellanas", "Hazelnuts"), l("20 g avellanas", "20 g hazelnuts")),
            meal(l("Pechuga rellena de espinacas", "Spinach-stuffed chicken breast"),
                 l("180 g pechuga, 40 g espinacas, 30 g queso de cabra", "180 g breast, 40 g spinach, 30 g goat cheese")),
            meal(l("Tiras de pimiento con hummus de coliflor", "Pepper strips with cauliflower hummus"),
                 l("1/2 pimiento, 50 g hummus de coliflor", "1/2 pepper, 50 g cauliflower hummus")),
            meal(l("Dorada a la sal", "Salt-baked sea bream"),
                 l("200 g dorada, ensalada de canónigos", "200 g sea bream, lamb's lettuce salad")),
        ],
    },
    TemplateDay {
        kcal: 1560,
        macros: macros(8, 26, 66),
        meals: [
            meal(l("Batido verde keto", "Keto green smoothie"),
                 l("espinacas, 1/2 aguacate, 200 ml leche de almendra, proteína", "spinach, 1/2 avocado, 200 ml almond milk, protein")),
            meal(l("Queso manchego", "Manchego cheese"), l("30 g manchego", "30 g manchego")),
            meal(l("Pavo con pisto", "Turkey with ratatouille"),
                 l("170 g pavo, 150 g pisto casero", "170 g turkey, 150 g homemade ratatouille")),
            meal(l("Almendras tostadas", "Roasted almonds"), l("20 g almendras", "20 g almonds")),
            meal(l("Sopa de pollo y verduras", "Chicken and vegetable soup"),
                 l("caldo, 120 g pollo, apio, puerro", "broth, 120 g chicken, celery, leek")),
        ],
    },
    TemplateDay {
        kcal: 1640,
        macros: macros(6, 25, 69),
        meals: [
            meal(l("Huevos benedictinos sin pan", "Breadless eggs benedict"),
                 l("2 huevos, 40 g jamón, salsa holandesa", "2 eggs, 40 g ham, hollandaise")),
            meal(l("Rábanos con mantequilla", "Radishes with butter"),
                 l("6 rábanos, 10 g mantequilla", "6 radishes, 10 g butter")),
            meal(l("Bacalao con pimientos del piquillo", "Cod with piquillo peppers"),
                 l("190 g bacalao, 80 g piquillos, ajo", "190 g cod, 80 g piquillo peppers, garlic")),
            meal(l("Yogur griego", "Greek yogurt"), l("125 g yogur griego entero", "125 g full-fat Greek yogurt")),
            meal(l("Entrecot con mantequilla de hierbas", "Rib-eye with herb butter"),
                 l("180 g entrecot, 10 g mantequilla, rúcula", "180 g rib-eye, 10 g butter, arugula")),
        ],
    },
    TemplateDay {
        kcal: 0,
        macros: macros(7, 25, 68),
        meals: [
            meal(l("Muffins de huevo", "Egg muffins"),
                 l("3 huevos, pimiento, cebolleta, 20 g queso", "3 eggs, bell pepper, scallion, 20 g cheese")),
            meal(l("Nueces pecanas", "Pecans"), l("20 g pecanas", "20 g pecans")),
            meal(l("Ensalada de atún y huevo", "Tuna and egg salad"),
                 l("120 g atún, 2 huevos, aceitunas, mayonesa", "120 g tuna, 2 eggs, olives, mayonnaise")),
            meal(l("Pepinillos con queso", "Pickles with cheese"),
                 l("3 pepinillos, 30 g queso", "3 pickles, 30 g cheese")),
            meal(l("Muslos de pollo al limón", "Lemon chicken thighs"),
                 l("200 g muslo, limón, romero, judías verdes", "200 g thighs, lemon, rosemary, green beans")),
        ],
    },
    TemplateDay {
        kcal: 1600,
        macros: macros(7, 26, 67),
        meals: [
            meal(l("Porridge keto", "Keto porridge"),
                 l("20 g lino molido, 20 g coco rallado, leche de almendra", "20 g ground flax, 20 g shredded coconut, almond milk")),
            meal(l("Cecina", "Cured beef"), l("30 g cecina", "30 g cured beef")),
            meal(l("Salmón teriyaki sin azúcar", "Sugar-free teriyaki salmon"),
                 l("160 g salmón, salsa teriyaki sin azúcar, bok choy", "160 g salmon, sugar-free teriyaki, bok choy")),
            meal(l("Moras", "Blackberries"), l("50 g moras, 15 g nata", "50 g blackberries, 15 g cream")),
            meal(l("Lasaña de calabacín", "Zucchini lasagna"),
                 l("láminas de calabacín, 120 g carne picada, bechamel keto", "zucchini sheets, 120 g ground meat, keto bechamel")),
        ],
    },
    TemplateDay {
        kcal: 1680,
        macros: macros(6, 24, 70),
        meals: [
            meal(l("Shakshuka", "Shakshuka"),
                 l("2 huevos, 100 g tomate, pimiento, comino", "2 eggs, 100 g tomato, pepper, cumin")),
            meal(l("Aguacate con sal", "Salted avocado"), l("1/2 aguacate", "1/2 avocado")),
            meal(l("Cordero asado con ensalada", "Roast lamb with salad"),
                 l("170 g cordero, ensalada de pepino y menta", "170 g lamb, cucumber and mint salad")),
            meal(l("Queso brie", "Brie"), l("30 g brie", "30 g brie")),
            meal(l("Pulpo a la gallega", "Galician-style octopus"),
                 l("180 g pulpo, pimentón, aceite de oliva", "180 g octopus, paprika, olive oil")),
        ],
    },
    TemplateDay {
        kcal: 1620,
        macros: macros(7, 25, 68),
        meals: [
            meal(l("Gofres keto", "Keto waffles"),
                 l("2 huevos, 30 g harina de almendra, 15 g mantequilla", "2 eggs, 30 g almond flour, 15 g butter")),
            meal(l("Pistachos", "Pistachios"), l("20 g pistachos", "20 g pistachios")),
            meal(l("Fajitas de pollo en lechuga", "Chicken fajita lettuce wraps"),
                 l("170 g pollo, pimientos, hojas de lechuga, nata agria", "170 g chicken, peppers, lettuce leaves, sour cream")),
            meal(l("Huevos rellenos", "Deviled eggs"), l("2 mitades de huevo relleno", "2 deviled egg halves")),
            meal(l("Pizza de base de coliflor", "Cauliflower crust pizza"),
                 l("base de coliflor, mozzarella, tomate, orégano", "cauliflower crust, mozzarella, tomato, oregano")),
        ],
    },
];

pub fn template_days() -> &'static [TemplateDay] {
    TEMPLATE_DAYS
}

impl TemplateDay {
    /// Owned, localized copy of a template day with a placeholder label
    pub fn localized(&self, lang: Language) -> PlanDay {
        let slot = |i: usize| {
            let m = &self.meals[i];
            MealSlot::new(m.name.get(lang), m.qty.get(lang))
        };

        PlanDay {
            day_label: String::new(),
            kcal: self.kcal,
            macros: self.macros,
            meals: DayMeals {
                desayuno: slot(0),
                snack_am: slot(1),
                almuerzo: slot(2),
                snack_pm: slot(3),
                cena: slot(4),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourteen_template_days() {
        assert_eq!(template_days().len(), 14);
    }

    #[test]
    fn test_macros_add_up() {
        for (i, day) in template_days().iter().enumerate() {
            let m = day.macros;
            let total = m.carbs as u32 + m.protein as u32 + m.fat as u32;
            assert_eq!(total, 100, "template day {} macros sum to {}", i, total);
        }
    }

    #[test]
    fn test_every_meal_has_both_languages() {
        for day in template_days() {
            for m in &day.meals {
                assert!(!m.name.es.is_empty() && !m.name.en.is_empty());
                assert!(!m.qty.es.is_empty() && !m.qty.en.is_empty());
            }
        }
    }

    #[test]
    fn test_localized_copy() {
        let day = template_days()[0].localized(Language::En);
        assert_eq!(day.meals.desayuno.name, "Scrambled eggs with avocado");
        assert_eq!(day.kcal, 1600);
        assert!(day.day_label.is_empty());
        assert!(!day.meals.cena.is_ai);
    }
}
