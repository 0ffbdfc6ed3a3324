//! OpenAPI document and Swagger UI, mounted only in Development.

use axum::{
    response::{Html, Redirect},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::forecast::SUMMARIES;
use crate::http::forecast::{LOGS_ROUTE, METRICS_ROUTE, TRACING_ROUTE};

pub const OPENAPI_ROUTE: &str = "/swagger/v1/swagger.json";
pub const SWAGGER_UI_ROUTE: &str = "/swagger/index.html";

/// Swagger routes, generic over the router state.
pub fn routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route(OPENAPI_ROUTE, get(|| async { Json(openapi_document()) }))
        .route(SWAGGER_UI_ROUTE, get(|| async { Html(swagger_ui()) }))
        .route("/swagger", get(|| async { Redirect::permanent(SWAGGER_UI_ROUTE) }))
}

/// OpenAPI 3 description of the forecast endpoints.
pub fn openapi_document() -> Value {
    let operation = |operation_id: &str| {
        json!({
            "get": {
                "tags": ["WeatherForecast"],
                "operationId": operation_id,
                "responses": {
                    "200": {
                        "description": "Success",
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "array",
                                    "items": { "$ref": "#/components/schemas/WeatherForecast" }
                                }
                            }
                        }
                    }
                }
            }
        })
    };

    json!({
        "openapi": "3.0.1",
        "info": {
            "title": env!("CARGO_PKG_NAME"),
            "version": "v1"
        },
        "paths": {
            LOGS_ROUTE: operation("GetWeatherForecastWithLogs"),
            METRICS_ROUTE: operation("GetWeatherForecastWithMetrics"),
            TRACING_ROUTE: operation("GetWeatherForecastWithTracing"),
        },
        "components": {
            "schemas": {
                "WeatherForecast": {
                    "type": "object",
                    "properties": {
                        "date": { "type": "string", "format": "date" },
                        "temperatureC": { "type": "integer", "format": "int32" },
                        "summary": { "type": "string", "enum": SUMMARIES }
                    },
                    "additionalProperties": false
                }
            }
        }
    })
}

fn swagger_ui() -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>{title} - Swagger UI</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {{
      window.ui = SwaggerUIBundle({{ url: "{document}", dom_id: "#swagger-ui" }});
    }};
  </script>
</body>
</html>
"##,
        title = env!("CARGO_PKG_NAME"),
        document = OPENAPI_ROUTE,
    )
}
