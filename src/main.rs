#[macro_use]
extern crate rocket;

use coldwar_cardgame::rocket_initialize;

#[launch]
fn rocket() -> _ {
    rocket_initialize()
}
