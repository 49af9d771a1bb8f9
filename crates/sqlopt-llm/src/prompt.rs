//! Prompt template selection and rendering.
//!
//! Four fixed templates, one per combination of MPP mode and live-
//! connection availability. The connection-backed variants carry the
//! `{query_plan}` and `{tables_meta}` placeholders; all four carry
//! `{query_text}` and `{optimized_query}`.

use serde::{Deserialize, Serialize};

const MPP_WITH_CONNECTION: &str = r#"Задача
Ты — специалист по оптимизации SQL-запросов в MPP-системах, включая Greenplum. Твоя цель — переписать SQL-запрос так, чтобы он выполнялся быстрее и использовал меньше ресурсов, без изменения логики и без вмешательства в СУБД.

Входные данные SQL-запрос:
{query_text}
План выполнения (EXPLAIN): {query_plan}
Метаданные таблиц: {tables_meta}

Выходные данные
Оптимизированный SQL-запрос:
{optimized_query}
Обоснование изменений:
Кратко опиши, какие узкие места были найдены в плане запроса, и какие методы оптимизации применены.
Оценка улучшения:
Примерное снижение времени выполнения или факторы, которые повлияют на производительность.
Потенциальные риски:
Возможные побочные эффекты изменений, если таковые имеются."#;

const MPP_NO_CONNECTION: &str = r#"Задача
Ты — специалист по оптимизации SQL-запросов в MPP-системах, включая Greenplum. Твоя цель — переписать SQL-запрос так, чтобы он выполнялся быстрее и использовал меньше ресурсов, без изменения логики и без вмешательства в СУБД.

Входные данные SQL-запрос:
{query_text}

Выходные данные
Оптимизированный SQL-запрос:
{optimized_query}
Обоснование изменений:
Кратко опиши, какие методы оптимизации применены и почему.
Оценка улучшения:
Примерное снижение времени выполнения или факторы, которые повлияют на производительность.
Потенциальные риски:
Возможные побочные эффекты изменений, если таковые имеются."#;

const POSTGRES_WITH_CONNECTION: &str = r#"Задача
Ты — специалист по оптимизации SQL-запросов в PostgreSQL. Твоя цель — переписать SQL-запрос так, чтобы он выполнялся быстрее и использовал меньше ресурсов, без изменения логики и без вмешательства в СУБД.

Входные данные SQL-запрос:
{query_text}
План выполнения (EXPLAIN): {query_plan}
Метаданные таблиц: {tables_meta}

Выходные данные
Оптимизированный SQL-запрос:
{optimized_query}
Обоснование изменений:
Кратко опиши, какие узкие места были найдены в плане запроса, и какие методы оптимизации применены.
Оценка улучшения:
Примерное снижение времени выполнения или факторы, которые повлияют на производительность.
Потенциальные риски:
Возможные побочные эффекты изменений, если таковые имеются."#;

const POSTGRES_NO_CONNECTION: &str = r#"Задача
Ты — специалист по оптимизации SQL-запросов в PostgreSQL. Твоя цель — переписать SQL-запрос так, чтобы он выполнялся быстрее и использовал меньше ресурсов, без изменения логики и без вмешательства в СУБД.

Входные данные SQL-запрос:
{query_text}

Выходные данные
Оптимизированный SQL-запрос:
{optimized_query}
Обоснование изменений:
Кратко опиши, какие методы оптимизации применены и почему.
Оценка улучшения:
Примерное снижение времени выполнения или факторы, которые повлияют на производительность.
Потенциальные риски:
Возможные побочные эффекты изменений, если таковые имеются."#;

/// Select the template for an optimization request. Pure and total.
pub fn select_prompt_template(is_mpp: bool, has_connection: bool) -> &'static str {
    match (is_mpp, has_connection) {
        (true, true) => MPP_WITH_CONNECTION,
        (true, false) => MPP_NO_CONNECTION,
        (false, true) => POSTGRES_WITH_CONNECTION,
        (false, false) => POSTGRES_NO_CONNECTION,
    }
}

/// Values substituted into a template's placeholder tokens. Fields left
/// empty substitute as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptContext {
    pub query_text: String,
    pub query_plan: String,
    pub tables_meta: String,
    pub optimized_query: String,
}

/// Substitute every placeholder occurrence in `template`. Total; tokens
/// without a value are replaced with the empty string.
pub fn render_prompt(template: &str, ctx: &PromptContext) -> String {
    template
        .replace("{query_text}", &ctx.query_text)
        .replace("{query_plan}", &ctx.query_plan)
        .replace("{tables_meta}", &ctx.tables_meta)
        .replace("{optimized_query}", &ctx.optimized_query)
}
