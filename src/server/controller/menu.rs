use actix_web::{get, web, Responder};
use crate::server::model::session::{GetMenuResponse, MenuGroup, MenuItem};
use crate::server::state::AppState;

#[get("/v1/menu")]
/// catalog grouped by course type
pub(crate) async fn get_menu(data: web::Data<AppState>) -> impl Responder {
    let groups = data
        .catalog()
        .grouped()
        .into_iter()
        .map(|(course_type, entries)| MenuGroup {
            course_type,
            label: course_type.label(),
            entries: entries
                .into_iter()
                .map(|(entry_id, e)| MenuItem {
                    entry_id,
                    description: e.description.clone(),
                    unit_price: e.unit_price,
                })
                .collect(),
        })
        .collect();
    web::Json(GetMenuResponse { groups })
}
