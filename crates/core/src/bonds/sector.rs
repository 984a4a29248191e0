/// Russian display label for a gateway sector tag. Unknown tags pass through.
pub fn translate_sector(sector: &str) -> &str {
    match sector {
        "financial" => "Финансы",
        "consumer" => "Потребительский",
        "real_estate" => "Недвижимость",
        "materials" => "Ресурсы",
        "utilities" => "Коммунальный",
        "telecom" => "Телекоммуникации",
        "industrials" => "Промышленность",
        "other" => "Другое",
        "health_care" => "Здравоохранение",
        "it" => "ИТ",
        "energy" => "Энергетика",
        "municipal" => "Муниципальный",
        "government" => "Государственный",
        unknown => unknown,
    }
}
